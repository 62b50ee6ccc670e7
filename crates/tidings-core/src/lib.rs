//! Core state machines for Tidings
//!
//! Presence and receipt logic for a chat client, decoupled from any transport
//! or storage. Everything here is synchronous and deterministic: callers feed
//! events in and read derived display values out.
//!
//! # Components
//!
//! - [`TypingPresenceTracker`]: ordered set of users typing in one
//!   conversation, rendered to a display string
//! - [`DeliveryStatusReducer`]: folds per-recipient receipts into one
//!   [`DeliveryStatus`] for a message
//! - [`ConversationMetadata`]: merge-or-replace key/value tree attached to a
//!   conversation, with the [`BackgroundColor`] entry
//! - [`Environment`]: time and randomness, swappable for simulation

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod delivery;
pub mod env;
pub mod error;
pub mod identity;
pub mod metadata;
pub mod presence;

pub use delivery::{DeliveryStatus, DeliveryStatusReducer, MessageReceipts, reduce};
pub use env::{Environment, SystemEnv};
pub use error::{MetadataError, SignalError};
pub use identity::{ConversationId, MessageId, Session, UserId};
pub use metadata::{BackgroundColor, ConversationMetadata, MergeMode, MetadataValue};
pub use presence::{TrackerConfig, TypingKind, TypingPresenceTracker, TypingSignal};
