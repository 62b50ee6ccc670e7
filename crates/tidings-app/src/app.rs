//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the state of
//! the conversation screen completely decoupled from I/O and the messaging
//! backend.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Tracks which conversation is displayed and who is typing in it.
//! - Keeps the displayed messages in position order and reduces their
//!   receipts to a status icon.
//! - Mirrors the conversation's header color from metadata.
//! - Turns composer input into outbound typing signals and messages.
//! - Tracks sync lifecycle for UI feedback.

use std::collections::BTreeMap;

use tidings_core::{
    BackgroundColor, ConversationId, DeliveryStatus, DeliveryStatusReducer, Environment, MergeMode,
    MessageId, MessageReceipts, Session, TrackerConfig, TypingKind, TypingPresenceTracker, UserId,
};

use crate::{AppAction, AppEvent, ConversationView, PUSH_MESSAGE_KEY, SyncState};

/// Application state machine.
///
/// Generic over the environment so the header color picker and idle eviction
/// run deterministically in simulation.
#[derive(Clone)]
pub struct App<E: Environment> {
    env: E,
    session: Session,
    /// Who is typing in the active conversation.
    typing: TypingPresenceTracker<E::Instant>,
    reducer: DeliveryStatusReducer,
    /// Displayed conversation. `None` if nothing is open.
    active: Option<ConversationView>,
    sync: SyncState,
}

impl<E: Environment> App<E> {
    /// Create an App for `session` with no conversation open.
    pub fn new(env: E, session: Session, config: TrackerConfig) -> Self {
        Self {
            env,
            typing: TypingPresenceTracker::new(session.clone(), config),
            reducer: DeliveryStatusReducer::new(session.clone()),
            session,
            active: None,
            sync: SyncState::Idle,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent<E::Instant>) -> Vec<AppAction> {
        match event {
            AppEvent::Tick { now } => {
                if self.typing.expire(now).is_empty() {
                    vec![]
                } else {
                    vec![self.render_typing()]
                }
            },
            AppEvent::ConversationOpened { conversation, roster, metadata } => {
                tracing::debug!(%conversation, participants = roster.len(), "conversation opened");
                self.typing.reset(conversation.clone());

                let mut view = ConversationView::new(conversation, roster, metadata);
                let mut actions = vec![self.render_typing()];
                actions.push(refresh_background(&mut view).unwrap_or(AppAction::ClearBackground));
                self.active = Some(view);
                actions
            },
            AppEvent::ConversationClosed { conversation } => {
                if !self.is_active(&conversation) {
                    return vec![];
                }
                tracing::debug!(%conversation, "conversation closed");
                self.active = None;
                self.typing.close();
                vec![self.render_typing()]
            },
            AppEvent::Typing { conversation, signal, at } => {
                if self.typing.apply(&conversation, signal, at) {
                    vec![self.render_typing()]
                } else {
                    vec![]
                }
            },
            AppEvent::MessageUpserted { conversation, message } => {
                let Some(view) = view_for(&mut self.active, &conversation) else {
                    return vec![];
                };

                let status = self.reducer.status_for(&message, &view.roster);
                let id = message.id.clone();
                let is_new = view.upsert_message(message);

                let mut actions = vec![AppAction::RenderDeliveryStatus { message: id, status }];
                if is_new {
                    actions.push(AppAction::ScrollToLatest);
                }
                actions
            },
            AppEvent::MessageRemoved { conversation, message } => {
                let removed = view_for(&mut self.active, &conversation)
                    .is_some_and(|view| view.remove_message(&message));
                if removed { vec![AppAction::RemoveMessage { message }] } else { vec![] }
            },
            AppEvent::MetadataChanged { conversation, metadata } => {
                let Some(view) = view_for(&mut self.active, &conversation) else {
                    return vec![];
                };
                view.metadata = metadata;
                refresh_background(view).into_iter().collect()
            },
            AppEvent::SyncStarted => {
                tracing::info!("sync starting");
                self.sync = SyncState::Syncing;
                vec![]
            },
            AppEvent::SyncCompleted => {
                tracing::info!("sync complete");
                self.sync = SyncState::Idle;
                vec![]
            },
            AppEvent::SyncFailed { errors } => {
                for error in &errors {
                    tracing::warn!(%error, "sync error");
                }
                self.sync = SyncState::Failed { errors };
                vec![]
            },
            AppEvent::ComposerEdited => self.publish_typing(TypingKind::Started),
            AppEvent::ComposerCleared => self.publish_typing(TypingKind::Finished),
            AppEvent::MessageSent { text } => self.send_message(text),
            AppEvent::HeaderTapped => self.recolor(),
        }
    }

    /// Tell participants of the active conversation we started or stopped
    /// typing.
    pub fn publish_typing(&self, kind: TypingKind) -> Vec<AppAction> {
        match &self.active {
            Some(view) => vec![AppAction::PublishTyping { conversation: view.id.clone(), kind }],
            None => vec![],
        }
    }

    /// Send `text` to the active conversation.
    ///
    /// The message carries a push notification text naming the local user.
    /// Blank text is not sent.
    pub fn send_message(&self, text: impl Into<String>) -> Vec<AppAction> {
        let text = text.into();
        let Some(view) = &self.active else {
            return vec![];
        };
        if text.trim().is_empty() {
            tracing::trace!(conversation = %view.id, "ignoring blank message");
            return vec![];
        }

        let push = format!("{}: {text}", self.session.local_user());
        let metadata = BTreeMap::from([(PUSH_MESSAGE_KEY.to_owned(), push)]);
        tracing::debug!(conversation = %view.id, "sending message");

        vec![AppAction::SendMessage {
            conversation: view.id.clone(),
            participants: view.roster.clone(),
            text,
            metadata,
        }]
    }

    /// Pick a random header color and store it in the conversation metadata.
    ///
    /// The local view updates immediately; the merge is echoed back later by
    /// a [`AppEvent::MetadataChanged`].
    pub fn recolor(&mut self) -> Vec<AppAction> {
        let Some(view) = self.active.as_mut() else {
            return vec![];
        };

        let color = BackgroundColor::random(&self.env);
        let update = color.to_metadata();
        view.metadata.put(update.clone(), MergeMode::Merge);
        view.background = Some(color);

        let conversation = view.id.clone();
        vec![
            AppAction::PutMetadata { conversation, update, mode: MergeMode::Merge },
            AppAction::RenderBackground { argb: color.to_argb() },
        ]
    }

    /// Session the App runs as.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Displayed conversation. `None` if nothing is open.
    pub fn active_conversation(&self) -> Option<&ConversationView> {
        self.active.as_ref()
    }

    /// Current typing indicator text.
    pub fn typing_text(&self) -> String {
        self.typing.render()
    }

    /// Users typing in the displayed conversation, in display order.
    pub fn typing_users(&self) -> impl Iterator<Item = &UserId> {
        self.typing.typing_users()
    }

    /// Messages of the displayed conversation, in position order.
    pub fn messages(&self) -> &[MessageReceipts] {
        self.active.as_ref().map_or(&[], |view| view.messages.as_slice())
    }

    /// Displayed status of a message. `None` if it is not in the open
    /// conversation.
    pub fn status_of(&self, message: &MessageId) -> Option<DeliveryStatus> {
        let view = self.active.as_ref()?;
        let receipts = view.message(message)?;
        Some(self.reducer.status_for(receipts, &view.roster))
    }

    /// Header color of the displayed conversation, if set.
    pub fn background(&self) -> Option<BackgroundColor> {
        self.active.as_ref().and_then(|view| view.background)
    }

    /// Last reported sync state.
    pub fn sync_state(&self) -> &SyncState {
        &self.sync
    }

    fn is_active(&self, conversation: &ConversationId) -> bool {
        self.active.as_ref().is_some_and(|view| &view.id == conversation)
    }

    fn render_typing(&self) -> AppAction {
        AppAction::RenderTyping { text: self.typing.render() }
    }
}

/// The active view, if it shows `conversation`.
fn view_for<'a>(
    active: &'a mut Option<ConversationView>,
    conversation: &ConversationId,
) -> Option<&'a mut ConversationView> {
    active.as_mut().filter(|view| &view.id == conversation)
}

/// Re-read the header color from the view's metadata.
///
/// A removed entry clears the header if a color was shown. A malformed entry
/// keeps the previous color and is logged.
fn refresh_background(view: &mut ConversationView) -> Option<AppAction> {
    match BackgroundColor::from_metadata(&view.metadata) {
        Ok(Some(color)) => {
            view.background = Some(color);
            Some(AppAction::RenderBackground { argb: color.to_argb() })
        },
        Ok(None) => view.background.take().map(|_| AppAction::ClearBackground),
        Err(e) => {
            tracing::warn!(conversation = %view.id, error = %e, "ignoring malformed header color");
            None
        },
    }
}
