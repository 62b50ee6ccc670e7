//! Error types for boundary decoding and metadata access.
//!
//! The state machines themselves are total: once a signal or receipt has been
//! decoded it can always be applied. Errors only arise while turning raw
//! backend values into typed ones.

use thiserror::Error;

/// Raw signal or receipt value that does not decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// Typing indicator kind other than `started` / `finished`.
    #[error("unknown typing indicator kind: {kind:?}")]
    UnknownKind {
        /// The raw kind as received
        kind: String,
    },

    /// Recipient status other than `sent` / `delivered` / `read`.
    #[error("unknown recipient status: {status:?}")]
    UnknownStatus {
        /// The raw status as received
        status: String,
    },
}

/// Malformed entry in conversation metadata.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetadataError {
    /// Entry was expected to be a nested map.
    #[error("metadata entry {key:?} is not a map")]
    NotAMap {
        /// Key of the offending entry
        key: String,
    },

    /// Required component missing from a nested map.
    #[error("metadata component {component:?} is missing")]
    MissingComponent {
        /// Name of the missing component
        component: &'static str,
    },

    /// Component present but not parseable.
    #[error("metadata component {component:?} has invalid value {value:?}")]
    InvalidComponent {
        /// Name of the component
        component: &'static str,
        /// Raw value that failed to parse
        value: String,
    },

    /// Component parsed but outside its allowed range.
    #[error("metadata component {component:?} out of range: {value}")]
    OutOfRange {
        /// Name of the component
        component: &'static str,
        /// Parsed value
        value: f32,
    },
}
