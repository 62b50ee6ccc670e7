//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: view state machine
//! - [`Driver`]: event feed and rendering surface

use tidings_core::{Environment, Session, TrackerConfig};

use crate::{App, AppAction, AppEvent, Driver};

/// Generic runtime that orchestrates App and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for time and randomness
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App<E>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
{
    /// Create a new runtime for `session`.
    pub fn new(driver: D, env: E, session: Session, config: TrackerConfig) -> Self {
        Self { driver, app: App::new(env, session, config) }
    }

    /// Run until the driver's feed closes.
    ///
    /// The driver is stopped on the way out, whether the feed closed or the
    /// driver failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let result = self.drain().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "runtime stopped on driver error");
        }

        self.driver.stop();
        result
    }

    async fn drain(&mut self) -> Result<(), D::Error> {
        while self.step().await? {}
        Ok(())
    }

    /// Process one event from the feed, followed by a tick.
    ///
    /// Returns `false` once the feed is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        let Some(event) = self.driver.poll_event().await? else {
            tracing::debug!("event feed closed");
            return Ok(false);
        };

        let actions = self.app.handle(event);
        self.process_actions(actions).await?;

        let now = self.driver.now();
        let actions = self.app.handle(AppEvent::Tick { now });
        self.process_actions(actions).await?;

        Ok(true)
    }

    /// Route actions to the screen or the backend.
    async fn process_actions(&mut self, actions: Vec<AppAction>) -> Result<(), D::Error> {
        for action in actions {
            if action.is_outbound() {
                self.driver.publish(action).await?;
            } else {
                self.driver.render(&self.app, &action)?;
            }
        }
        Ok(())
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App<E> {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App<E> {
        &mut self.app
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }
}
