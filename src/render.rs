//! Low-level terminal line control.
//!
//! Stateless helpers invoked under the printer's coordination lock. All
//! escape output goes through crossterm commands queued onto a writer, so
//! tests can capture the exact byte stream.

use std::io::{self, IsTerminal, Write};

use crossterm::{
    cursor::{Hide, MoveToColumn, Show},
    style::Print,
    terminal::{self, Clear, ClearType},
    QueueableCommand,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::message::Stream;

/// Columns taken by the filled portion of a progress bar.
const BAR_WIDTH: usize = 30;

/// Whether `stream` is attached to an interactive terminal. Queried at
/// call time; the environment owns this fact, not the renderer.
pub fn is_terminal(stream: Stream) -> bool {
    match stream {
        Stream::Stdout => io::stdout().is_terminal(),
        Stream::Stderr => io::stderr().is_terminal(),
        Stream::Suppressed => false,
    }
}

/// Terminal width in columns, if `stream` is an interactive terminal.
pub fn terminal_width(stream: Stream) -> Option<u16> {
    if !is_terminal(stream) {
        return None;
    }
    terminal::size().ok().map(|(cols, _)| cols)
}

/// Run `f` against the writer backing `stream`. Suppressed messages have
/// no terminal surface and resolve to an immediate `Ok`.
pub fn with_writer<F>(stream: Stream, f: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    match stream {
        Stream::Stdout => f(&mut io::stdout()),
        Stream::Stderr => f(&mut io::stderr()),
        Stream::Suppressed => Ok(()),
    }
}

/// Erase the current (unfinalized) line and park the cursor at column 0.
pub fn erase_line(w: &mut dyn Write) -> io::Result<()> {
    w.queue(MoveToColumn(0))?;
    w.queue(Clear(ClearType::UntilNewLine))?;
    w.flush()
}

/// Write `content`, terminating with a real line break when `end_line`.
/// Without the break the cursor stays at end-of-content for a future
/// overwrite.
pub fn write_line(w: &mut dyn Write, content: &str, end_line: bool) -> io::Result<()> {
    w.queue(Print(content))?;
    if end_line {
        w.queue(Print("\n"))?;
    }
    w.flush()
}

/// Finalize whatever is on the current line with a line break.
pub fn line_break(w: &mut dyn Write) -> io::Result<()> {
    w.queue(Print("\n"))?;
    w.flush()
}

pub fn hide_cursor(w: &mut dyn Write) -> io::Result<()> {
    w.queue(Hide)?;
    w.flush()
}

pub fn show_cursor(w: &mut dyn Write) -> io::Result<()> {
    w.queue(Show)?;
    w.flush()
}

/// Clip `content` to `width` display columns, appending an ellipsis when
/// something was cut. Wide characters count by their column width.
pub fn clip_to_width(content: &str, width: u16) -> String {
    let width = width as usize;
    if UnicodeWidthStr::width(content) <= width {
        return content.to_string();
    }
    let limit = width.saturating_sub(1);
    let mut out = String::new();
    let mut cols = 0;
    for ch in content.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if cols + w > limit {
            break;
        }
        out.push(ch);
        cols += w;
    }
    out.push('…');
    out
}

/// Render a fixed-width proportional bar with a percentage label, e.g.
/// `downloading [###############---------------] 50%`. A zero total
/// renders an indeterminate bar with no percentage.
pub fn format_bar(text: &str, progress: u64, total: u64) -> String {
    if total == 0 {
        return format!("{text} [{}]", "-".repeat(BAR_WIDTH));
    }
    let clamped = progress.min(total);
    let fraction = clamped as f64 / total as f64;
    let filled = (fraction * BAR_WIDTH as f64).round() as usize;
    let percent = (fraction * 100.0).round() as u64;
    format!(
        "{text} [{}{}] {percent}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}
