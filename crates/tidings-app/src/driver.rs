//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from the messaging
//! backend and the UI toolkit. Each frontend implements the trait to provide
//! its event feed and rendering surface, while the generic [`crate::Runtime`]
//! handles all orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use tidings_core::Environment;

use crate::{App, AppAction, AppEvent};

/// Abstracts I/O operations for the application runtime.
///
/// The capability surface is deliberately narrow: one stream of events in,
/// render actions and outbound actions out.
///
/// # Implementations
///
/// - **CLI**: replays a JSON-lines script and prints what would be drawn
/// - **Simulation**: in-memory queue with invariant checks on every render
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Wait for the next event.
    ///
    /// Returns `None` once the feed is closed.
    fn poll_event(
        &mut self,
    ) -> impl Future<Output = Result<Option<AppEvent<Self::Instant>>, Self::Error>> + Send;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Apply a render action to the screen.
    ///
    /// The App is passed along so the surface can read any state it needs.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render<E>(&mut self, app: &App<E>, action: &AppAction) -> Result<(), Self::Error>
    where
        E: Environment<Instant = Self::Instant>;

    /// Hand an outbound action to the messaging backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects or cannot be reached.
    fn publish(
        &mut self,
        action: AppAction,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Release resources. Called once after the feed closes.
    fn stop(&mut self);
}
