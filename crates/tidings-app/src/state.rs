//! Observable application state types.
//!
//! These structures are the "View Model": the subset of backend state the
//! conversation screen needs, without any of the backend's query or sync
//! machinery.

use tidings_core::{
    BackgroundColor, ConversationId, ConversationMetadata, MessageId, MessageReceipts, UserId,
};

/// Backend sync lifecycle as last reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncState {
    /// No sync in progress.
    #[default]
    Idle,
    /// Sync in progress.
    Syncing,
    /// Last sync reported errors.
    Failed {
        /// Error descriptions as reported by the backend.
        errors: Vec<String>,
    },
}

/// State of the displayed conversation.
#[derive(Debug, Clone)]
pub struct ConversationView {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Participants, including the local user.
    pub roster: Vec<UserId>,
    /// Messages ordered by position.
    pub messages: Vec<MessageReceipts>,
    /// Latest known metadata.
    pub metadata: ConversationMetadata,
    /// Header color, if one has been set.
    pub background: Option<BackgroundColor>,
}

impl ConversationView {
    /// Create a view with no messages.
    pub fn new(id: ConversationId, roster: Vec<UserId>, metadata: ConversationMetadata) -> Self {
        Self { id, roster, messages: Vec::new(), metadata, background: None }
    }

    /// Insert or replace a message, keeping position order.
    ///
    /// Returns `true` if the message was not present before.
    ///
    /// A receipt update that keeps its position replaces the message in
    /// place, so rows sharing a position never swap.
    pub fn upsert_message(&mut self, message: MessageReceipts) -> bool {
        let existing = self.messages.iter().position(|m| m.id == message.id);
        if let Some(index) = existing {
            if self.messages[index].position == message.position {
                self.messages[index] = message;
                return false;
            }
            self.messages.remove(index);
        }

        let at = self.messages.partition_point(|m| m.position <= message.position);
        self.messages.insert(at, message);
        existing.is_none()
    }

    /// Remove a message. Returns `true` if it was present.
    pub fn remove_message(&mut self, id: &MessageId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| &m.id != id);
        self.messages.len() != before
    }

    /// Look up a message by id.
    pub fn message(&self, id: &MessageId) -> Option<&MessageReceipts> {
        self.messages.iter().find(|m| &m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ConversationView {
        ConversationView::new(
            ConversationId::new("c"),
            vec![UserId::new("alice"), UserId::new("bob")],
            ConversationMetadata::new(),
        )
    }

    #[test]
    fn upsert_orders_by_position() {
        let mut view = view();
        assert!(view.upsert_message(MessageReceipts::new("m3", "bob", 3)));
        assert!(view.upsert_message(MessageReceipts::new("m1", "bob", 1)));
        assert!(view.upsert_message(MessageReceipts::new("m2", "bob", 2)));

        let ids: Vec<&str> = view.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2", "m3"]);
    }

    #[test]
    fn upsert_replaces_existing() {
        let mut view = view();
        view.upsert_message(MessageReceipts::new("m1", "alice", 1));

        let updated = MessageReceipts::new("m1", "alice", 1)
            .with_status("bob", tidings_core::DeliveryStatus::Read);
        assert!(!view.upsert_message(updated.clone()));

        assert_eq!(view.messages.len(), 1);
        assert_eq!(view.message(&MessageId::new("m1")), Some(&updated));
    }

    #[test]
    fn receipt_update_keeps_place_among_equal_positions() {
        let mut view = view();
        view.upsert_message(MessageReceipts::new("m1", "alice", 5));
        view.upsert_message(MessageReceipts::new("m2", "alice", 5));

        let updated = MessageReceipts::new("m1", "alice", 5)
            .with_status("bob", tidings_core::DeliveryStatus::Read);
        assert!(!view.upsert_message(updated));

        let ids: Vec<&str> = view.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2"]);
    }

    #[test]
    fn moved_message_is_replaced() {
        let mut view = view();
        view.upsert_message(MessageReceipts::new("m1", "alice", 1));
        view.upsert_message(MessageReceipts::new("m2", "alice", 2));

        assert!(!view.upsert_message(MessageReceipts::new("m1", "alice", 3)));

        let ids: Vec<&str> = view.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m2", "m1"]);
    }

    #[test]
    fn remove_reports_presence() {
        let mut view = view();
        view.upsert_message(MessageReceipts::new("m1", "alice", 1));

        assert!(view.remove_message(&MessageId::new("m1")));
        assert!(!view.remove_message(&MessageId::new("m1")));
    }
}
