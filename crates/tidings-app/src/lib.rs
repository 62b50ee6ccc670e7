//! Application layer for Tidings
//!
//! Pure state machine and generic runtime for a chat conversation view,
//! enabling deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: view state machine (typing line, message statuses, header color)
//! - [`Driver`]: trait for the platform's event feed and rendering surface
//! - [`Runtime`]: generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod event;
mod runtime;
mod state;

pub use action::{AppAction, PUSH_MESSAGE_KEY};
pub use app::App;
pub use driver::Driver;
pub use event::AppEvent;
pub use runtime::Runtime;
pub use state::{ConversationView, SyncState};
