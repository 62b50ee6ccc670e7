//! Identifiers and the injected session context.
//!
//! User, conversation and message identifiers are opaque strings assigned by
//! the messaging backend. They are wrapped in newtypes so a conversation id
//! can never be passed where a user id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a chat participant.
///
/// Equality and hashing are exact. Identity checks that decide "is this the
/// same person" (self-exclusion, sender checks) go through
/// [`UserId::matches`], which ignores ASCII case because the backend treats
/// user ids case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a backend user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether both ids name the same user, ignoring ASCII case.
    pub fn matches(&self, other: &UserId) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Wrap a backend conversation id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap a backend message id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identity context of the authenticated local user.
///
/// Passed into every component that needs to know "who am I" instead of
/// being looked up from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    local_user: UserId,
}

impl Session {
    /// Create a session for the given local user.
    pub fn new(local_user: impl Into<UserId>) -> Self {
        Self { local_user: local_user.into() }
    }

    /// The authenticated local user.
    pub fn local_user(&self) -> &UserId {
        &self.local_user
    }

    /// Whether `user` is the local user.
    pub fn is_local(&self, user: &UserId) -> bool {
        self.local_user.matches(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_ignores_ascii_case() {
        let a = UserId::new("Alice");
        let b = UserId::new("alice");

        assert!(a.matches(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn session_recognises_local_user() {
        let session = Session::new("Device");

        assert!(session.is_local(&UserId::new("device")));
        assert!(!session.is_local(&UserId::new("Emulator")));
    }

    #[test]
    fn ids_display_raw_string() {
        assert_eq!(ConversationId::new("c-1").to_string(), "c-1");
        assert_eq!(MessageId::new("m-1").to_string(), "m-1");
        assert_eq!(UserId::new("bob").to_string(), "bob");
    }
}
