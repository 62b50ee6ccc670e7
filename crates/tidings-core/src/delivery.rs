//! Delivery status reduction.
//!
//! Each recipient of a message moves through Sent → Delivered → Read
//! independently. The status line shows one icon per message, so the
//! per-recipient receipts are folded into a single [`DeliveryStatus`].
//!
//! The fold reports the *best* status any recipient has reached: one reader
//! is enough to show Read. This is what deployed clients display, so it is
//! kept even though "everyone has read it" would be the stricter reading.

use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{MessageId, Session, SignalError, UserId};

/// Propagation state of a message, ordered Sent < Delivered < Read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Accepted by the backend, not yet on the recipient's device.
    Sent,
    /// On the recipient's device.
    Delivered,
    /// Seen by the recipient.
    Read,
}

impl DeliveryStatus {
    /// Wire name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = SignalError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        [Self::Sent, Self::Delivered, Self::Read]
            .into_iter()
            .find(|status| raw.eq_ignore_ascii_case(status.as_str()))
            .ok_or_else(|| SignalError::UnknownStatus { status: raw.to_string() })
    }
}

/// Receipt view of one message, as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipts {
    /// Message identifier.
    pub id: MessageId,
    /// Author of the message.
    pub sender: UserId,
    /// Stable ordering position within the conversation.
    pub position: u64,
    /// Per-recipient status. Recipients without an entry have not reported.
    #[serde(default)]
    pub recipients: HashMap<UserId, DeliveryStatus>,
}

impl MessageReceipts {
    /// Message with no receipts yet.
    pub fn new(id: impl Into<MessageId>, sender: impl Into<UserId>, position: u64) -> Self {
        Self { id: id.into(), sender: sender.into(), position, recipients: HashMap::new() }
    }

    /// Record `status` for `recipient`.
    #[must_use]
    pub fn with_status(mut self, recipient: impl Into<UserId>, status: DeliveryStatus) -> Self {
        self.recipients.insert(recipient.into(), status);
        self
    }
}

/// Fold per-recipient receipts into the status shown for a message.
///
/// Roster members matching `sender` are skipped, as are members with no entry
/// in `statuses`. Any Read wins immediately; otherwise Delivered if any
/// recipient reached it; otherwise Sent, including when nobody contributed.
pub fn reduce(
    sender: &UserId,
    statuses: &HashMap<UserId, DeliveryStatus>,
    roster: &[UserId],
) -> DeliveryStatus {
    let mut delivered = false;

    for participant in roster.iter().filter(|p| !p.matches(sender)) {
        match statuses.get(participant) {
            Some(DeliveryStatus::Read) => return DeliveryStatus::Read,
            Some(DeliveryStatus::Delivered) => delivered = true,
            Some(DeliveryStatus::Sent) | None => {},
        }
    }

    if delivered { DeliveryStatus::Delivered } else { DeliveryStatus::Sent }
}

/// Computes the displayed status of messages for the local user.
#[derive(Debug, Clone)]
pub struct DeliveryStatusReducer {
    session: Session,
}

impl DeliveryStatusReducer {
    /// Create a reducer viewing messages as the session's local user.
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Displayed status of `message` in a conversation with `roster`.
    ///
    /// Messages someone else sent are shown as Read: the local user is looking
    /// at them. Only our own messages are reduced over their receipts.
    pub fn status_for(&self, message: &MessageReceipts, roster: &[UserId]) -> DeliveryStatus {
        if !self.session.is_local(&message.sender) {
            return DeliveryStatus::Read;
        }
        reduce(&message.sender, &message.recipients, roster)
    }

    /// Session the reducer views messages as.
    pub fn session(&self) -> &Session {
        &self.session
    }
}
