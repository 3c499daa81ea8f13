//! Ladle
//!
//! Terminal status-output coordination for command-line tools.
//!
//! Provides:
//! - [`Printer`] serializing concurrent writers onto one terminal surface
//! - Ephemeral lines overwritten in place, finalized lines left untouched
//! - A liveness [spinner](SpinnerConfig) for long-running ephemeral status
//! - Progress-bar rendering with width-aware clipping
//! - Secret redaction applied identically to terminal and log output
//! - A flush-on-write log mirror that survives abrupt termination
//!
//! The higher-level command layer (argument parsing, verbosity policy)
//! calls [`Printer::show`] for every user-visible line and
//! [`Printer::stop`] exactly once at shutdown.

pub mod message;
pub mod printer;
pub mod redact;
pub mod render;
pub mod sink;
pub mod spinner;

pub use message::{BarHint, Message, Stream};
pub use printer::{Printer, PrinterError};
pub use redact::MASK;
pub use spinner::SpinnerConfig;
