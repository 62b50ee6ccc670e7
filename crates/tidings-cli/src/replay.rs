//! Script driver for the CLI.
//!
//! Implements the [`Driver`] trait over a line reader and a text sink. Each
//! render action becomes one line of output; outbound actions are printed
//! with a `->` prefix instead of being sent anywhere.

use std::{io::Write, time::Instant};

use tidings_app::{App, AppAction, AppEvent, Driver};
use tidings_core::{Environment, SystemEnv};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::{ReplayError, Step, decode_line};

/// Script driver implementing the [`Driver`] trait.
///
/// Reads script lines from `R` and writes rendered output to `W`.
pub struct ScriptDriver<R, W> {
    lines: Lines<R>,
    line: usize,
    env: SystemEnv,
    out: W,
}

impl<R, W> ScriptDriver<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    /// Create a driver reading the script from `reader`.
    pub fn new(reader: R, out: W, env: SystemEnv) -> Self {
        Self { lines: reader.lines(), line: 0, env, out }
    }

    /// Output written so far.
    pub fn output(&self) -> &W {
        &self.out
    }
}

impl<R, W> Driver for ScriptDriver<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    type Error = ReplayError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent<Instant>>, Self::Error> {
        while let Some(text) = self.lines.next_line().await? {
            self.line += 1;
            match decode_line(self.line, &text)? {
                None => {},
                Some(Step::Pause(duration)) => {
                    tracing::debug!(line = self.line, ?duration, "pausing script");
                    self.env.sleep(duration).await;
                },
                Some(Step::Event(pending)) => return Ok(Some(pending.stamp(self.env.now()))),
            }
        }
        Ok(None)
    }

    fn now(&self) -> Instant {
        self.env.now()
    }

    fn render<E>(&mut self, _app: &App<E>, action: &AppAction) -> Result<(), Self::Error>
    where
        E: Environment<Instant = Self::Instant>,
    {
        match action {
            AppAction::RenderTyping { text } if text.is_empty() => {
                writeln!(self.out, "typing: -")?;
            },
            AppAction::RenderTyping { text } => writeln!(self.out, "typing: {text}")?,
            AppAction::RenderDeliveryStatus { message, status } => {
                writeln!(self.out, "status {message}: {status}")?;
            },
            AppAction::RemoveMessage { message } => writeln!(self.out, "removed {message}")?,
            AppAction::RenderBackground { argb } => writeln!(self.out, "background #{argb:08X}")?,
            AppAction::ClearBackground => writeln!(self.out, "background -")?,
            AppAction::ScrollToLatest => writeln!(self.out, "scroll to latest")?,
            AppAction::PublishTyping { .. }
            | AppAction::PutMetadata { .. }
            | AppAction::SendMessage { .. } => {
                tracing::warn!(?action, "outbound action routed to render");
            },
        }
        Ok(())
    }

    async fn publish(&mut self, action: AppAction) -> Result<(), Self::Error> {
        match action {
            AppAction::PublishTyping { conversation, kind } => {
                writeln!(self.out, "-> typing {kind} in {conversation}")?;
            },
            AppAction::PutMetadata { conversation, update, mode } => {
                let json = serde_json::to_string(&update).map_err(ReplayError::Encode)?;
                writeln!(self.out, "-> metadata {mode:?} in {conversation}: {json}")?;
            },
            AppAction::SendMessage { conversation, text, metadata, .. } => {
                let json = serde_json::to_string(&metadata).map_err(ReplayError::Encode)?;
                writeln!(self.out, "-> message in {conversation}: {text:?} {json}")?;
            },
            other => tracing::warn!(action = ?other, "render action routed to publish"),
        }
        Ok(())
    }

    fn stop(&mut self) {
        if let Err(e) = self.out.flush() {
            tracing::warn!(error = %e, "failed to flush output");
        }
    }
}
