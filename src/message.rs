//! Message types for terminal and log output.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Local};

use crate::render;

/// Timestamp format used for log lines and timestamped terminal lines.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Separator between the terminal prefix and the message body.
const PREFIX_SEPARATOR: &str = " :: ";

/// Logical output target for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// The process standard output.
    Stdout,
    /// The process standard error.
    Stderr,
    /// No terminal surface; the message only reaches the log file.
    Suppressed,
}

impl Stream {
    /// Name used in log lines.
    pub fn name(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
            Stream::Suppressed => "suppressed",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Progress values attached to a message. Both fields travel together,
/// so a message either has a full bar hint or none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarHint {
    /// Work completed so far, clamped into `[0, total]` at render time.
    pub progress: u64,
    /// Total amount of work. Zero renders an indeterminate bar.
    pub total: u64,
}

/// A single output request for [`Printer::show`].
///
/// Built with chained setters:
///
/// ```no_run
/// # use std::path::Path;
/// # use ladle::{Message, Printer, Stream};
/// # let printer = Printer::new(Path::new("app.log")).unwrap();
/// printer.show(Message::new(Stream::Stdout, "Building...").ephemeral(true)).unwrap();
/// ```
///
/// [`Printer::show`]: crate::Printer::show
#[derive(Debug, Clone)]
pub struct Message {
    pub(crate) stream: Stream,
    pub(crate) text: String,
    pub(crate) ephemeral: bool,
    pub(crate) use_timestamp: bool,
    pub(crate) end_line: bool,
    pub(crate) avoid_logging: bool,
    pub(crate) bar: Option<BarHint>,
}

impl Message {
    /// Create a plain message for `stream`. All options default to off.
    pub fn new(stream: Stream, text: impl Into<String>) -> Self {
        Self {
            stream,
            text: text.into(),
            ephemeral: false,
            use_timestamp: false,
            end_line: false,
            avoid_logging: false,
            bar: None,
        }
    }

    /// Mark the line as overwritable by the next message on the same stream.
    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Prepend a timestamp to the rendered line.
    pub fn with_timestamp(mut self, use_timestamp: bool) -> Self {
        self.use_timestamp = use_timestamp;
        self
    }

    /// Finalize the line with a real line break, making it un-erasable.
    pub fn end_line(mut self, end_line: bool) -> Self {
        self.end_line = end_line;
        self
    }

    /// Skip the log file for this message.
    pub fn skip_log(mut self, avoid_logging: bool) -> Self {
        self.avoid_logging = avoid_logging;
        self
    }

    /// Render a proportional progress bar instead of plain text.
    pub fn bar(mut self, progress: u64, total: u64) -> Self {
        self.bar = Some(BarHint { progress, total });
        self
    }
}

/// Immutable snapshot of one accepted output event.
///
/// Captured under the coordination lock: the text is already redacted and
/// the prefix is the one in effect at creation time, so later prefix or
/// secret changes never alter an already-rendered line.
#[derive(Debug, Clone)]
pub(crate) struct MessageInfo {
    pub stream: Stream,
    /// Redacted text. The raw input does not outlive the `show` call.
    pub text: String,
    pub ephemeral: bool,
    pub bar: Option<BarHint>,
    pub use_timestamp: bool,
    /// Whether the line was finalized with a line break. Forced on when
    /// the target is not an interactive terminal.
    pub end_line: bool,
    /// Capture instant, used for spinner staleness and elapsed display.
    pub created_at: Instant,
    /// Wall-clock capture time for rendering and logging.
    pub timestamp: DateTime<Local>,
    /// Prefix in effect when the message was created.
    pub terminal_prefix: String,
}

impl MessageInfo {
    /// Compose the line as drawn on the terminal: optional timestamp,
    /// prefix, then the body (plain text or progress bar).
    pub fn terminal_text(&self) -> String {
        let body = match self.bar {
            Some(bar) => render::format_bar(&self.text, bar.progress, bar.total),
            None => self.text.clone(),
        };
        let prefixed = if self.terminal_prefix.is_empty() {
            body
        } else {
            format!("{}{}{}", self.terminal_prefix, PREFIX_SEPARATOR, body)
        };
        if self.use_timestamp {
            format!("{} {}", self.timestamp.format(TIMESTAMP_FORMAT), prefixed)
        } else {
            prefixed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(text: &str) -> MessageInfo {
        MessageInfo {
            stream: Stream::Stdout,
            text: text.to_string(),
            ephemeral: false,
            bar: None,
            use_timestamp: false,
            end_line: false,
            created_at: Instant::now(),
            timestamp: Local::now(),
            terminal_prefix: String::new(),
        }
    }

    #[test]
    fn test_message_defaults() {
        let msg = Message::new(Stream::Stdout, "hello");
        assert!(!msg.ephemeral);
        assert!(!msg.use_timestamp);
        assert!(!msg.end_line);
        assert!(!msg.avoid_logging);
        assert!(msg.bar.is_none());
    }

    #[test]
    fn test_message_builder_chain() {
        let msg = Message::new(Stream::Stderr, "working")
            .ephemeral(true)
            .with_timestamp(true)
            .end_line(true)
            .skip_log(true);
        assert_eq!(msg.stream, Stream::Stderr);
        assert!(msg.ephemeral);
        assert!(msg.use_timestamp);
        assert!(msg.end_line);
        assert!(msg.avoid_logging);
    }

    #[test]
    fn test_bar_travels_as_a_pair() {
        let msg = Message::new(Stream::Stdout, "downloading").bar(30, 100);
        assert_eq!(
            msg.bar,
            Some(BarHint {
                progress: 30,
                total: 100
            })
        );
    }

    #[test]
    fn test_stream_names() {
        assert_eq!(Stream::Stdout.name(), "stdout");
        assert_eq!(Stream::Stderr.name(), "stderr");
        assert_eq!(Stream::Suppressed.to_string(), "suppressed");
    }

    #[test]
    fn test_terminal_text_plain() {
        assert_eq!(info("hello").terminal_text(), "hello");
    }

    #[test]
    fn test_terminal_text_with_prefix() {
        let mut msg = info("hello");
        msg.terminal_prefix = "pkg".to_string();
        assert_eq!(msg.terminal_text(), "pkg :: hello");
    }

    #[test]
    fn test_terminal_text_with_timestamp() {
        let mut msg = info("hello");
        msg.use_timestamp = true;
        let line = msg.terminal_text();
        assert!(line.ends_with(" hello"));
        // ISO-8601 date prefix, e.g. 2026-08-05T...
        assert_eq!(line.as_bytes()[4], b'-');
        assert_eq!(line.as_bytes()[10], b'T');
    }

    #[test]
    fn test_terminal_text_bar_keeps_prefix_order() {
        let mut msg = info("downloading");
        msg.terminal_prefix = "pkg".to_string();
        msg.bar = Some(BarHint {
            progress: 5,
            total: 10,
        });
        let line = msg.terminal_text();
        assert!(line.starts_with("pkg :: downloading ["));
        assert!(line.ends_with("] 50%"));
    }
}
