//! Script replay for Tidings
//!
//! A thin shell over [`tidings_app::Driver`] that reads a JSON-lines event
//! script and prints what a conversation screen would draw. All orchestration
//! logic lives in the generic [`tidings_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod replay;
pub mod script;

use std::io;

use thiserror::Error;
use tidings_core::SignalError;

pub use replay::ScriptDriver;
pub use script::{PendingEvent, Step, decode_line};

/// Script replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Reading the script or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A line is not a valid script entry.
    #[error("line {line}: {source}")]
    Decode {
        /// 1-based line number.
        line: usize,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A typing entry names an unknown kind.
    #[error("line {line}: {source}")]
    Signal {
        /// 1-based line number.
        line: usize,
        /// Underlying signal error.
        source: SignalError,
    },

    /// An outbound metadata update could not be printed.
    #[error("cannot encode metadata: {0}")]
    Encode(serde_json::Error),
}
