//! Deterministic simulation harness for Tidings testing.
//!
//! Virtual-time implementations of the Environment and Driver traits for
//! deterministic, reproducible tests of the App and Runtime.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the common
//! view invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_env;

pub use invariants::{
    ForeignMessagesRead, Invariant, InvariantKind, InvariantRegistry, InvariantResult,
    MessageSnapshot, MessagesOrdered, NoDuplicateTypists, NoSelfTyping, NoTypingWithoutConversation,
    SystemSnapshot, TypingTextMatchesUsers, ViewSnapshot, Violation,
};
pub use sim_driver::{SimDriver, SimDriverError, SimObserver};
pub use sim_env::{SimEnv, SimInstant};
