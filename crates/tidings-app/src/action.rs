//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.
//! Render actions go to the rendering surface; outbound actions go to the
//! messaging backend.

use std::collections::BTreeMap;

use tidings_core::{
    ConversationId, ConversationMetadata, DeliveryStatus, MergeMode, MessageId, TypingKind, UserId,
};

/// Message metadata key carrying the push notification text.
pub const PUSH_MESSAGE_KEY: &str = "layer-push-message";

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Redraw the typing indicator line.
    RenderTyping {
        /// Text to show. Empty hides the line.
        text: String,
    },

    /// Redraw the status icon of a message.
    RenderDeliveryStatus {
        /// Message to update.
        message: MessageId,
        /// Status to show.
        status: DeliveryStatus,
    },

    /// Drop a message from the list.
    RemoveMessage {
        /// Message to drop.
        message: MessageId,
    },

    /// Repaint the conversation header.
    RenderBackground {
        /// Opaque ARGB color.
        argb: u32,
    },

    /// Reset the conversation header to the default color.
    ClearBackground,

    /// Scroll the message list to the newest message.
    ScrollToLatest,

    /// Tell the other participants we started or stopped typing.
    PublishTyping {
        /// Conversation being composed in.
        conversation: ConversationId,
        /// Started or finished.
        kind: TypingKind,
    },

    /// Store a metadata update on the conversation.
    PutMetadata {
        /// Conversation to update.
        conversation: ConversationId,
        /// Update to apply.
        update: ConversationMetadata,
        /// How the update combines with existing metadata.
        mode: MergeMode,
    },

    /// Send a text message to the conversation.
    ///
    /// The backend creates the conversation with `participants` if it does
    /// not exist yet.
    SendMessage {
        /// Conversation to send to.
        conversation: ConversationId,
        /// Participants, including the local user.
        participants: Vec<UserId>,
        /// Message body.
        text: String,
        /// Message metadata. Holds the push text under [`PUSH_MESSAGE_KEY`].
        metadata: BTreeMap<String, String>,
    },
}

impl AppAction {
    /// Whether this action goes to the backend rather than the screen.
    pub fn is_outbound(&self) -> bool {
        matches!(
            self,
            Self::PublishTyping { .. } | Self::PutMetadata { .. } | Self::SendMessage { .. }
        )
    }
}
