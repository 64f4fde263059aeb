//! Console output for multiplexed service logs.

use nexus_core::{LogLine, LogSink, ServiceLabel, Severity};
use std::io::{IsTerminal, Write};
use std::sync::Mutex;

const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const NX_BADGE: &str = "\x1b[44;30m";
const RESET: &str = "\x1b[0m";

/// Width every service tag is padded to, so line texts start in one column.
const TAG_WIDTH: usize = 10;

fn tag_text(service: ServiceLabel) -> String {
    match service {
        ServiceLabel::Nexus => " NX ".to_string(),
        other => format!("[{other}]"),
    }
}

const fn tag_color(service: ServiceLabel) -> &'static str {
    match service {
        ServiceLabel::Nexus => NX_BADGE,
        ServiceLabel::Engine => MAGENTA,
        ServiceLabel::App => CYAN,
        ServiceLabel::Frontend => YELLOW,
    }
}

/// Render `<tag> <text>` with the tag padded to a fixed width.
pub fn format_line(line: &LogLine, color: bool) -> String {
    let tag = tag_text(line.service);
    let padding = " ".repeat(TAG_WIDTH.saturating_sub(tag.len()));

    if !color {
        return format!("{tag}{padding} {}", line.text);
    }

    let text = match line.severity {
        Severity::Info => line.text.clone(),
        Severity::Error => format!("{RED}{}{RESET}", line.text),
    };
    format!("{}{tag}{RESET}{padding} {text}", tag_color(line.service))
}

/// Writes lines to stdout, one locked write per line.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    color: bool,
}

impl ConsoleSink {
    /// Colors on when stdout is a terminal and `NO_COLOR` is unset.
    pub fn new() -> Self {
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self { color }
    }

    pub const fn with_color(color: bool) -> Self {
        Self { color }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for ConsoleSink {
    fn emit(&self, line: LogLine) {
        let rendered = format_line(&line, self.color);
        let mut out = std::io::stdout().lock();
        // Nowhere left to report a broken stdout
        let _ = writeln!(out, "{rendered}");
    }
}

/// Keeps every line in memory. Useful for tests and embedding.
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<LogLine>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines so far, in arrival order.
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Texts of the lines emitted under `service`, in arrival order.
    pub fn texts(&self, service: ServiceLabel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.service == service)
            .map(|l| l.text)
            .collect()
    }
}

impl LogSink for CollectingSink {
    fn emit(&self, line: LogLine) {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(line);
    }
}
