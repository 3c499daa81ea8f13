//! Append-only log file sink.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

/// Flush-on-write log file writer.
///
/// The handle is owned exclusively by the printer for its lifetime. Every
/// accepted write is flushed so the most recent line survives an abrupt
/// process termination. Rotation is left to external collaborators
/// operating on the same path between runs.
#[derive(Debug)]
pub struct LogSink {
    path: PathBuf,
    handle: Option<File>,
    /// Set after the first failed write; later writes become no-ops so a
    /// broken log is reported once instead of on every message.
    failed: bool,
}

impl LogSink {
    /// Open `path` for append, creating parent directories as needed.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let handle = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            handle: Some(handle),
            failed: false,
        })
    }

    /// Append one line and flush it to disk.
    pub fn append(&mut self, line: &str) {
        if self.failed {
            return;
        }
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        let result = writeln!(handle, "{line}").and_then(|()| handle.flush());
        if let Err(e) = result {
            self.failed = true;
            warn!(
                path = %self.path.display(),
                error = %e,
                "log write failed; continuing without log",
            );
        }
    }

    /// Flush and release the handle. Further appends are no-ops.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            let _ = handle.flush();
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
