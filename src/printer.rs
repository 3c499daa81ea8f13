//! The output coordinator.
//!
//! [`Printer`] serializes status messages, progress bars, and spinner
//! frames onto the terminal while mirroring a redacted copy of every
//! message to an append-only log file. All rendering and logging happens
//! under one coordination lock shared with the spinner thread.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use crate::message::{Message, MessageInfo, Stream, TIMESTAMP_FORMAT};
use crate::redact::SecretRedactor;
use crate::render;
use crate::sink::LogSink;
use crate::spinner::{SpinnerConfig, SpinnerHandle};

/// Errors surfaced to the command layer.
#[derive(Debug, Error)]
pub enum PrinterError {
    /// A mutating call arrived after [`Printer::stop`] completed. This is
    /// a lifecycle bug in the caller and is never swallowed.
    #[error("printer already stopped")]
    Stopped,

    /// The log file could not be opened for append.
    #[error("failed to open log file: {0}")]
    Log(#[from] io::Error),
}

/// What must happen to the previously drawn line before the next draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineTransition {
    /// The previous line is finalized; nothing on screen needs touching.
    Keep,
    /// Overwrite in place: erase the previous ephemeral line first.
    Erase,
    /// Finalize the previous line with a break so it is not clobbered.
    Break,
}

/// An unfinished ephemeral line on the same stream is overwritten; an
/// unfinished line on another stream, or a persistent one, is finalized
/// first. A line that already ended in a break is never touched again.
fn line_transition(prev: &MessageInfo, next: &MessageInfo) -> LineTransition {
    if prev.end_line {
        LineTransition::Keep
    } else if prev.ephemeral && prev.stream == next.stream {
        LineTransition::Erase
    } else {
        LineTransition::Break
    }
}

/// State guarded by the coordination lock.
#[derive(Debug)]
pub(crate) struct State {
    pub stopped: bool,
    /// Last rendered message; decides whether the next draw must erase or
    /// finalize the current line. Terminals expose no read-back of prior
    /// content, so this is the single source of truth for the line state.
    pub prv_msg: Option<MessageInfo>,
    pub log: LogSink,
    pub terminal_prefix: String,
    pub secrets: SecretRedactor,
    pub cursor_hidden: bool,
    /// Set when a spinner tick failed; no further spinner is spawned.
    pub spinner_disabled: bool,
}

/// State shared between the printer and its spinner thread.
#[derive(Debug)]
pub(crate) struct Shared {
    pub state: Mutex<State>,
}

/// Coordinates every write to the terminal and the log file.
///
/// One instance owns the terminal's last-line state and the log handle
/// for the process's diagnostic lifetime. Create it once, call
/// [`show`](Self::show) from any thread, and call [`stop`](Self::stop)
/// exactly once at shutdown (error paths included).
#[derive(Debug)]
pub struct Printer {
    shared: Arc<Shared>,
    /// Spinner lifecycle slot. Lock order is fixed: this slot first, then
    /// `Shared::state`, so a join never runs while the state lock is held.
    spinner: Mutex<Option<SpinnerHandle>>,
    spinner_config: SpinnerConfig,
}

impl Printer {
    /// Open `log_path` for append (creating parent directories) and take
    /// control of the terminal.
    pub fn new(log_path: &Path) -> Result<Self, PrinterError> {
        Self::with_spinner_config(log_path, SpinnerConfig::default())
    }

    /// Like [`new`](Self::new) with custom spinner timings and frames.
    pub fn with_spinner_config(
        log_path: &Path,
        spinner_config: SpinnerConfig,
    ) -> Result<Self, PrinterError> {
        let log = LogSink::open(log_path)?;
        let mut cursor_hidden = false;
        if render::is_terminal(Stream::Stdout) {
            cursor_hidden = render::with_writer(Stream::Stdout, render::hide_cursor).is_ok();
        }
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                stopped: false,
                prv_msg: None,
                log,
                terminal_prefix: String::new(),
                secrets: SecretRedactor::new(),
                cursor_hidden,
                spinner_disabled: false,
            }),
        });
        Ok(Self {
            shared,
            spinner: Mutex::new(None),
            spinner_config,
        })
    }

    /// Render one message and mirror it to the log.
    ///
    /// Fails with [`PrinterError::Stopped`] after [`stop`](Self::stop).
    /// Terminal or log write failures are reported through `tracing` and
    /// never fail the call; the line state still advances so overwrite
    /// logic stays consistent for subsequent messages.
    pub fn show(&self, message: Message) -> Result<(), PrinterError> {
        let mut spinner = self.spinner.lock();
        let ephemeral = message.ephemeral;
        let avoid_logging = message.avoid_logging;
        // Suppressed messages are pure log events: they leave the visible
        // line state and the spinner untouched.
        let touches_terminal = message.stream != Stream::Suppressed;

        let spinner_enabled = {
            let mut state = self.shared.state.lock();
            if state.stopped {
                return Err(PrinterError::Stopped);
            }

            let info = MessageInfo {
                stream: message.stream,
                text: state.secrets.redact(&message.text).into_owned(),
                ephemeral: message.ephemeral,
                bar: message.bar,
                use_timestamp: message.use_timestamp,
                // Without an interactive terminal every line is final.
                end_line: message.end_line || !render::is_terminal(message.stream),
                created_at: Instant::now(),
                timestamp: Local::now(),
                terminal_prefix: state.terminal_prefix.clone(),
            };

            if touches_terminal {
                if let Err(e) = Self::render_terminal(&state, &info) {
                    debug!(error = %e, "terminal render failed");
                }
            }
            if !avoid_logging {
                let line = format!(
                    "{} {}: {}",
                    info.timestamp.format(TIMESTAMP_FORMAT),
                    info.stream.name(),
                    info.text,
                );
                state.log.append(&line);
            }
            if touches_terminal {
                state.prv_msg = Some(info);
            }
            !state.spinner_disabled
        };

        if !touches_terminal {
            return Ok(());
        }
        // Spinner lifecycle, outside the state lock: a fresh message always
        // restarts the idle wait, a persistent message ends the animation.
        if ephemeral {
            if let Some(handle) = spinner.as_ref() {
                handle.reset();
            } else if spinner_enabled {
                *spinner = Some(SpinnerHandle::spawn(
                    Arc::clone(&self.shared),
                    self.spinner_config.clone(),
                ));
            }
        } else if let Some(handle) = spinner.take() {
            handle.stop();
        }
        Ok(())
    }

    /// Set the prefix applied to messages created after this call.
    /// Already-rendered lines are never revisited.
    pub fn set_terminal_prefix(&self, prefix: &str) -> Result<(), PrinterError> {
        let mut state = self.shared.state.lock();
        if state.stopped {
            return Err(PrinterError::Stopped);
        }
        state.terminal_prefix = prefix.to_string();
        Ok(())
    }

    /// Add a value to the redaction set, effective for subsequent
    /// messages on both the terminal and the log.
    pub fn register_secret(&self, value: &str) -> Result<(), PrinterError> {
        let mut state = self.shared.state.lock();
        if state.stopped {
            return Err(PrinterError::Stopped);
        }
        state.secrets.register(value);
        Ok(())
    }

    /// Path of the log file this printer mirrors to.
    pub fn log_path(&self) -> PathBuf {
        self.shared.state.lock().log.path().to_path_buf()
    }

    /// Release the terminal and the log file.
    ///
    /// Joins the spinner thread, finalizes a dangling unfinished line,
    /// restores cursor visibility, and closes the log. Idempotent: later
    /// calls are no-ops, and later `show` calls fail with
    /// [`PrinterError::Stopped`].
    pub fn stop(&self) {
        let mut spinner = self.spinner.lock();
        if let Some(handle) = spinner.take() {
            handle.stop();
        }
        let mut state = self.shared.state.lock();
        if state.stopped {
            return;
        }
        if let Some(prev) = &state.prv_msg {
            if !prev.end_line {
                let _ = render::with_writer(prev.stream, render::line_break);
            }
        }
        if state.cursor_hidden {
            let _ = render::with_writer(Stream::Stdout, render::show_cursor);
            state.cursor_hidden = false;
        }
        state.log.close();
        state.stopped = true;
    }

    /// Erase or finalize the previous line as needed, then draw `info`.
    fn render_terminal(state: &State, info: &MessageInfo) -> io::Result<()> {
        if let Some(prev) = &state.prv_msg {
            match line_transition(prev, info) {
                LineTransition::Erase => {
                    render::with_writer(prev.stream, render::erase_line)?;
                }
                LineTransition::Break => {
                    render::with_writer(prev.stream, render::line_break)?;
                }
                LineTransition::Keep => {}
            }
        }
        let mut content = info.terminal_text();
        if info.ephemeral && !info.end_line {
            if let Some(width) = render::terminal_width(info.stream) {
                content = render::clip_to_width(&content, width.saturating_sub(1));
            }
        }
        render::with_writer(info.stream, |w| render::write_line(w, &content, info.end_line))
    }

    #[cfg(test)]
    pub(crate) fn shared_for_tests(&self) -> Arc<Shared> {
        Arc::clone(&self.shared)
    }
}

impl Drop for Printer {
    /// Safety net for crash paths; the contract remains one explicit
    /// `stop()` call.
    fn drop(&mut self) {
        self.stop();
    }
}
