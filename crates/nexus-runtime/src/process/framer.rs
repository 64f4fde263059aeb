//! Line reassembly for chunked process output.
//!
//! Child processes can emit non-UTF8 bytes, and a read may end anywhere: in
//! the middle of a line, exactly on a terminator, or inside a multi-byte
//! character. Bytes are buffered until `\n` and each completed line is decoded
//! with lossy UTF-8, so the output is the same for every chunking of the input.

/// Splits a byte stream into lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    partial: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every line it completes.
    ///
    /// Blank lines are returned as empty strings. Never returns a partial line.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.partial.extend_from_slice(&rest[..pos]);
            lines.push(self.take_line());
            rest = &rest[pos + 1..];
        }

        self.partial.extend_from_slice(rest);
        lines
    }

    /// End of stream: the unterminated remainder, if it has any text.
    pub fn finish(&mut self) -> Option<String> {
        let line = self.take_line();
        (!line.is_empty()).then_some(line)
    }

    /// Bytes buffered for the current unterminated line.
    pub fn pending(&self) -> usize {
        self.partial.len()
    }

    fn take_line(&mut self) -> String {
        if self.partial.last() == Some(&b'\r') {
            self.partial.pop();
        }
        let line = String::from_utf8_lossy(&self.partial).into_owned();
        self.partial.clear();
        line
    }
}
