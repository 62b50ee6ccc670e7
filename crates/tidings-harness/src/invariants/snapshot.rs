//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use tidings_app::App;
use tidings_core::{ConversationId, DeliveryStatus, Environment, MessageId, UserId};

/// Snapshot of the entire system state.
///
/// Contains one view per simulated client.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-client view snapshots.
    pub views: Vec<ViewSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no clients).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single client.
    pub fn single(view: ViewSnapshot) -> Self {
        Self { views: vec![view] }
    }

    /// Add a client snapshot.
    pub fn add_view(&mut self, view: ViewSnapshot) {
        self.views.push(view);
    }
}

/// One message as the view shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSnapshot {
    /// Message identifier.
    pub id: MessageId,
    /// Author.
    pub sender: UserId,
    /// Ordering position.
    pub position: u64,
    /// Displayed status.
    pub status: DeliveryStatus,
}

/// Snapshot of one client's conversation view.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    /// The authenticated local user.
    pub local_user: UserId,
    /// Displayed conversation. `None` if nothing is open.
    pub conversation: Option<ConversationId>,
    /// Users shown as typing, in display order.
    pub typing: Vec<UserId>,
    /// Rendered typing line.
    pub typing_text: String,
    /// Messages in display order.
    pub messages: Vec<MessageSnapshot>,
}

impl ViewSnapshot {
    /// Empty view for `local_user`.
    pub fn new(local_user: impl Into<UserId>) -> Self {
        Self {
            local_user: local_user.into(),
            conversation: None,
            typing: Vec::new(),
            typing_text: String::new(),
            messages: Vec::new(),
        }
    }

    /// Extract the observable view of an App.
    pub fn from_app<E: Environment>(app: &App<E>) -> Self {
        let messages = app
            .messages()
            .iter()
            .map(|m| MessageSnapshot {
                id: m.id.clone(),
                sender: m.sender.clone(),
                position: m.position,
                status: app.status_of(&m.id).unwrap_or(DeliveryStatus::Sent),
            })
            .collect();

        Self {
            local_user: app.session().local_user().clone(),
            conversation: app.active_conversation().map(|view| view.id.clone()),
            typing: app.typing_users().cloned().collect(),
            typing_text: app.typing_text(),
            messages,
        }
    }

    /// Set the displayed conversation.
    #[must_use]
    pub fn with_conversation(mut self, conversation: impl Into<ConversationId>) -> Self {
        self.conversation = Some(conversation.into());
        self
    }

    /// Set the typing list and the text rendered for it.
    #[must_use]
    pub fn with_typing(mut self, users: &[&str], text: &str) -> Self {
        self.typing = users.iter().map(|u| UserId::new(*u)).collect();
        self.typing_text = text.to_string();
        self
    }

    /// Append a message.
    #[must_use]
    pub fn with_message(mut self, message: MessageSnapshot) -> Self {
        self.messages.push(message);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot() {
        assert!(SystemSnapshot::empty().views.is_empty());
    }

    #[test]
    fn view_snapshot_builder() {
        let view = ViewSnapshot::new("me")
            .with_conversation("c")
            .with_typing(&["bob"], "bob is typing");

        assert_eq!(view.conversation, Some(ConversationId::new("c")));
        assert_eq!(view.typing, vec![UserId::new("bob")]);
        assert_eq!(view.typing_text, "bob is typing");
    }
}
