//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` replays an injected queue of events on the virtual clock of a
//! [`SimEnv`]. It implements [`Driver`] so the same [`tidings_app::Runtime`]
//! orchestration code runs in both the CLI and simulation.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tidings_app::{App, AppAction, AppEvent, Driver};
use tidings_core::{ConversationId, Environment, TypingSignal};

use crate::{
    invariants::{InvariantRegistry, SystemSnapshot, ViewSnapshot},
    sim_env::{SimEnv, SimInstant},
};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Queued step of a scenario.
enum Scripted {
    Event(AppEvent<SimInstant>),
    /// Typing signal stamped with the clock at the moment it is polled.
    TypingNow { conversation: ConversationId, signal: TypingSignal },
    Advance(Duration),
}

/// Shared state for event injection.
///
/// This allows injection from outside async contexts.
#[derive(Default)]
struct SharedState {
    pending: VecDeque<Scripted>,
    rendered: Vec<AppAction>,
    published: Vec<AppAction>,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Render actions and outbound actions are captured in memory instead of
/// reaching a screen or backend.
pub struct SimDriver {
    env: SimEnv,
    state: Arc<Mutex<SharedState>>,
    invariants: Option<InvariantRegistry>,
}

impl SimDriver {
    /// Create a driver reading time from `env`.
    pub fn new(env: SimEnv) -> Self {
        Self { env, state: Arc::new(Mutex::new(SharedState::default())), invariants: None }
    }

    /// Enable invariant checking after every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Queue an event for processing.
    pub fn inject_event(&self, event: AppEvent<SimInstant>) {
        self.lock().pending.push_back(Scripted::Event(event));
    }

    /// Queue a typing signal, stamped with the virtual time it is delivered
    /// at.
    pub fn inject_typing(&self, conversation: impl Into<ConversationId>, signal: TypingSignal) {
        let conversation = conversation.into();
        self.lock().pending.push_back(Scripted::TypingNow { conversation, signal });
    }

    /// Queue a clock advance. It takes effect before the next event is
    /// delivered.
    pub fn inject_advance(&self, by: Duration) {
        self.lock().pending.push_back(Scripted::Advance(by));
    }

    /// Check if there are pending steps.
    pub fn has_pending(&self) -> bool {
        !self.lock().pending.is_empty()
    }

    /// Render actions seen so far, in order.
    pub fn rendered(&self) -> Vec<AppAction> {
        self.lock().rendered.clone()
    }

    /// Take all captured outbound actions.
    pub fn take_published(&self) -> Vec<AppAction> {
        std::mem::take(&mut self.lock().published)
    }

    /// Whether the runtime has stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Environment the driver reads time from.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Handle onto the captured output that outlives the driver.
    ///
    /// Needed after [`tidings_app::Runtime::run`], which consumes the driver.
    pub fn observer(&self) -> SimObserver {
        SimObserver { state: Arc::clone(&self.state) }
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_invariants<E>(&self, app: &App<E>, action: &AppAction) -> Result<(), SimDriverError>
    where
        E: Environment,
    {
        let Some(registry) = &self.invariants else {
            return Ok(());
        };

        let snapshot = SystemSnapshot::single(ViewSnapshot::from_app(app));
        registry.check_all(&snapshot).map_err(|violations| {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            tracing::error!(?action, violations = messages.len(), "invariant violated");
            SimDriverError(format!("after {action:?}: {}", messages.join("; ")))
        })
    }
}

/// Read-only view of what a [`SimDriver`] captured.
#[derive(Clone)]
pub struct SimObserver {
    state: Arc<Mutex<SharedState>>,
}

impl SimObserver {
    /// Render actions seen so far, in order.
    pub fn rendered(&self) -> Vec<AppAction> {
        self.lock().rendered.clone()
    }

    /// Outbound actions seen so far, in order.
    pub fn published(&self) -> Vec<AppAction> {
        self.lock().published.clone()
    }

    /// Whether the runtime has stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent<SimInstant>>, Self::Error> {
        loop {
            let next = self.lock().pending.pop_front();
            match next {
                Some(Scripted::Advance(by)) => {
                    tracing::trace!(?by, "advancing virtual clock");
                    self.env.advance(by);
                },
                Some(Scripted::TypingNow { conversation, signal }) => {
                    let at = self.env.now();
                    return Ok(Some(AppEvent::Typing { conversation, signal, at }));
                },
                Some(Scripted::Event(event)) => return Ok(Some(event)),
                None => return Ok(None),
            }
        }
    }

    fn now(&self) -> SimInstant {
        self.env.now()
    }

    fn render<E>(&mut self, app: &App<E>, action: &AppAction) -> Result<(), Self::Error>
    where
        E: Environment<Instant = Self::Instant>,
    {
        self.lock().rendered.push(action.clone());
        self.check_invariants(app, action)
    }

    async fn publish(&mut self, action: AppAction) -> Result<(), Self::Error> {
        self.lock().published.push(action);
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inject_event_queues_event() {
        let driver = SimDriver::new(SimEnv::with_seed(0));
        driver.inject_event(AppEvent::SyncStarted);

        assert!(driver.has_pending());
    }

    #[tokio::test]
    async fn advance_applies_before_next_event() {
        let env = SimEnv::with_seed(0);
        let mut driver = SimDriver::new(env.clone());

        driver.inject_advance(Duration::from_secs(2));
        driver.inject_typing("c", TypingSignal::started("bob"));

        let event = driver.poll_event().await;
        let Ok(Some(AppEvent::Typing { at, .. })) = event else {
            unreachable!("expected typing event");
        };
        assert_eq!(at.since_start(), Duration::from_secs(2));
        assert!(!driver.has_pending());
    }

    #[tokio::test]
    async fn observer_sees_output_after_driver_dropped() {
        let mut driver = SimDriver::new(SimEnv::with_seed(0));
        let observer = driver.observer();

        driver.publish(AppAction::ScrollToLatest).await.unwrap();
        driver.stop();
        drop(driver);

        assert_eq!(observer.published(), [AppAction::ScrollToLatest]);
        assert!(observer.is_stopped());
    }

    #[tokio::test]
    async fn empty_queue_closes_feed() {
        let mut driver = SimDriver::new(SimEnv::with_seed(0));

        assert!(matches!(driver.poll_event().await, Ok(None)));
    }
}
