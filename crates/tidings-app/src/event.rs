//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two sources:
//! - Local user interaction with the composer and header.
//! - Notifications from the messaging backend: conversation and message
//!   changes, typing indicators, sync lifecycle.

use tidings_core::{
    ConversationId, ConversationMetadata, MessageId, MessageReceipts, TypingSignal, UserId,
};

/// Events processed by the App state machine.
///
/// Generic over `I` (instant type) so simulation can run on virtual time.
#[derive(Debug, Clone)]
pub enum AppEvent<I = std::time::Instant> {
    /// Periodic tick for idle eviction.
    Tick {
        /// Current time from the driver.
        now: I,
    },

    /// The UI started displaying a conversation.
    ConversationOpened {
        /// Conversation now displayed.
        conversation: ConversationId,
        /// Participants, including the local user.
        roster: Vec<UserId>,
        /// Metadata at the time of opening.
        metadata: ConversationMetadata,
    },

    /// The UI stopped displaying a conversation.
    ConversationClosed {
        /// Conversation no longer displayed.
        conversation: ConversationId,
    },

    /// Typing indicator from the backend.
    Typing {
        /// Conversation the indicator is scoped to.
        conversation: ConversationId,
        /// Who started or finished.
        signal: TypingSignal,
        /// When the indicator arrived.
        at: I,
    },

    /// A message was inserted or its receipts changed.
    MessageUpserted {
        /// Conversation the message belongs to.
        conversation: ConversationId,
        /// Current receipt view of the message.
        message: MessageReceipts,
    },

    /// A message was deleted.
    MessageRemoved {
        /// Conversation the message belonged to.
        conversation: ConversationId,
        /// Deleted message.
        message: MessageId,
    },

    /// Conversation metadata changed.
    MetadataChanged {
        /// Conversation whose metadata changed.
        conversation: ConversationId,
        /// Full metadata after the change.
        metadata: ConversationMetadata,
    },

    /// Backend sync started.
    SyncStarted,

    /// Backend sync finished.
    SyncCompleted,

    /// Backend sync reported errors.
    SyncFailed {
        /// Error descriptions as reported by the backend.
        errors: Vec<String>,
    },

    /// Local user edited the composer text.
    ComposerEdited,

    /// Local user sent or discarded the composer text.
    ComposerCleared,

    /// Local user pressed send.
    MessageSent {
        /// Composer text at the time of sending.
        text: String,
    },

    /// Local user tapped the conversation header.
    HeaderTapped,
}
