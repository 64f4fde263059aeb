//! Async output stream readers.
//!
//! Reads raw chunks rather than `BufReader::lines()`: `lines()` stops the
//! reader on the first invalid UTF-8 sequence, and child tooling (compilers,
//! bundlers, native servers) does emit those.

use nexus_core::{LogLine, LogSink, ServiceLabel};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::debug;

use super::framer::LineFramer;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Drain `stream` on its own task, emitting one `LogLine` per complete line.
///
/// On end of stream the unterminated remainder is flushed as a final line, then
/// the task ends. Read errors end the task the same way.
pub fn attach(
    stream: impl AsyncRead + Unpin + Send + 'static,
    service: ServiceLabel,
    stream_type: &'static str,
    sink: Arc<dyn LogSink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = stream;
        let mut framer = LineFramer::new();
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];

        loop {
            match stream.read(&mut chunk).await {
                Ok(0) => break, // EOF
                Ok(n) => {
                    for text in framer.push(&chunk[..n]) {
                        sink.emit(LogLine::new(service, text));
                    }
                }
                Err(e) => {
                    debug!(
                        %service,
                        %stream_type,
                        error = %e,
                        "log stream reader exiting due to read error"
                    );
                    break;
                }
            }
        }

        if let Some(text) = framer.finish() {
            sink.emit(LogLine::new(service, text));
        }

        debug!(%service, %stream_type, "log stream reader task exiting");
    })
}
