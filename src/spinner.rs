//! Liveness spinner for stale ephemeral lines.
//!
//! A background thread that redraws the current ephemeral line with an
//! animation glyph and elapsed time once no new message has arrived for a
//! while. Spinner frames are transient UI and never reach the log.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::message::MessageInfo;
use crate::printer::Shared;
use crate::render;

/// Animation frames.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Timing and appearance of the liveness spinner.
#[derive(Debug, Clone)]
pub struct SpinnerConfig {
    /// Animation frames, one per tick.
    pub frames: &'static [&'static str],
    /// Tick interval.
    pub interval: Duration,
    /// Idle time after the last message before the spinner starts drawing.
    pub stale_after: Duration,
}

impl Default for SpinnerConfig {
    fn default() -> Self {
        Self {
            frames: SPINNER_FRAMES,
            interval: Duration::from_millis(100),
            stale_after: Duration::from_secs(2),
        }
    }
}

/// Control messages for the spinner thread.
enum Signal {
    /// A new message arrived; restart the idle wait.
    Reset,
    /// Shut down.
    Stop,
}

/// Handle owning the spinner thread.
#[derive(Debug)]
pub(crate) struct SpinnerHandle {
    tx: Sender<Signal>,
    thread: Option<JoinHandle<()>>,
}

impl SpinnerHandle {
    /// Spawn the spinner thread against the printer's shared state.
    pub fn spawn(shared: Arc<Shared>, config: SpinnerConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let thread = thread::spawn(move || run(&shared, &config, &rx));
        Self {
            tx,
            thread: Some(thread),
        }
    }

    /// Restart the idle wait after a fresh message.
    pub fn reset(&self) {
        let _ = self.tx.send(Signal::Reset);
    }

    /// Cooperative shutdown: signal the thread and wait for it to finish,
    /// so no tick can fire afterwards.
    pub fn stop(mut self) {
        let _ = self.tx.send(Signal::Stop);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run(shared: &Shared, config: &SpinnerConfig, rx: &Receiver<Signal>) {
    let mut frame = 0usize;
    loop {
        match rx.recv_timeout(config.interval) {
            Ok(Signal::Reset) => continue,
            Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        // Redraws happen under the same lock as `show`, so no two renders
        // can interleave.
        let mut state = shared.state.lock();
        if state.stopped {
            break;
        }
        let Some(msg) = state.prv_msg.as_ref() else {
            continue;
        };
        if !msg.ephemeral || msg.end_line {
            continue;
        }
        if msg.created_at.elapsed() < config.stale_after {
            continue;
        }
        let glyph = config.frames[frame % config.frames.len()];
        frame += 1;
        if let Err(e) = redraw(msg, glyph) {
            // An animation glitch must never take down the host process;
            // stop animating for the rest of the run instead.
            debug!(error = %e, "spinner render failed; disabling spinner");
            state.spinner_disabled = true;
            break;
        }
    }
}

/// Compose a spinner frame: glyph, the rendered line, elapsed suffix.
fn spin_text(msg: &MessageInfo, glyph: &str) -> String {
    let elapsed = msg.created_at.elapsed().as_secs_f64();
    format!("{glyph} {} ({elapsed:.1}s)", msg.terminal_text())
}

/// Redraw the current ephemeral line with a glyph and elapsed suffix.
fn redraw(msg: &MessageInfo, glyph: &str) -> io::Result<()> {
    if !render::is_terminal(msg.stream) {
        return Ok(());
    }
    let mut content = spin_text(msg, glyph);
    if let Some(width) = render::terminal_width(msg.stream) {
        content = render::clip_to_width(&content, width.saturating_sub(1));
    }
    render::with_writer(msg.stream, |w| {
        render::erase_line(w)?;
        render::write_line(w, &content, false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Stream;
    use crate::printer::Printer;
    use chrono::Local;
    use std::time::Instant;

    #[test]
    fn test_spin_text_carries_elapsed_indicator() {
        let started = Instant::now()
            .checked_sub(Duration::from_secs(5))
            .unwrap_or_else(Instant::now);
        let msg = MessageInfo {
            stream: Stream::Stdout,
            text: "Building...".to_string(),
            ephemeral: true,
            bar: None,
            use_timestamp: false,
            end_line: false,
            created_at: started,
            timestamp: Local::now(),
            terminal_prefix: String::new(),
        };
        let line = spin_text(&msg, "⠋");
        assert!(line.starts_with("⠋ Building... ("));
        assert!(line.ends_with("s)"));
    }

    #[test]
    fn test_config_defaults() {
        let config = SpinnerConfig::default();
        assert_eq!(config.interval, Duration::from_millis(100));
        assert_eq!(config.stale_after, Duration::from_secs(2));
        assert!(!config.frames.is_empty());
    }

    #[test]
    fn test_spawn_reset_stop_joins_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let config = SpinnerConfig {
            interval: Duration::from_millis(5),
            stale_after: Duration::from_millis(10),
            ..SpinnerConfig::default()
        };
        let printer =
            Printer::with_spinner_config(&dir.path().join("run.log"), config.clone()).unwrap();
        let handle = SpinnerHandle::spawn(printer.shared_for_tests(), config);
        handle.reset();
        thread::sleep(Duration::from_millis(30));
        // Must return promptly with the thread joined.
        handle.stop();
    }

    #[test]
    fn test_stop_without_ticks() {
        let dir = tempfile::tempdir().unwrap();
        let printer = Printer::new(&dir.path().join("run.log")).unwrap();
        let handle = SpinnerHandle::spawn(printer.shared_for_tests(), SpinnerConfig::default());
        handle.stop();
    }
}
