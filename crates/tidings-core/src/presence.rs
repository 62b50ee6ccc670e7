//! Typing presence tracking.
//!
//! [`TypingPresenceTracker`] keeps the ordered set of users currently typing in
//! the displayed conversation and renders it for the status line.
//!
//! # Invariants
//!
//! - Users appear in the order they first started typing; a repeated
//!   `Started` never moves a user.
//! - No user appears twice.
//! - The local user never appears.
//! - Signals scoped to any conversation other than the tracked one are
//!   ignored.
//!
//! # Idle eviction
//!
//! The backend does not guarantee a `Finished` for every `Started`. With
//! [`TrackerConfig::idle_timeout`] set, [`TypingPresenceTracker::expire`]
//! drops users whose last `Started` is at least that old. Without it users
//! stay marked as typing until they finish or the conversation is reset.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{ConversationId, Session, SignalError, UserId};

/// Whether a user began or stopped composing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypingKind {
    /// User started composing.
    Started,
    /// User stopped composing.
    Finished,
}

impl TypingKind {
    /// Wire name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for TypingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypingKind {
    type Err = SignalError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.eq_ignore_ascii_case("started") {
            Ok(Self::Started)
        } else if raw.eq_ignore_ascii_case("finished") {
            Ok(Self::Finished)
        } else {
            Err(SignalError::UnknownKind { kind: raw.to_string() })
        }
    }
}

/// A typing indicator from one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingSignal {
    /// User the indicator is about.
    pub user: UserId,
    /// Started or finished.
    pub kind: TypingKind,
}

impl TypingSignal {
    /// `user` started typing.
    pub fn started(user: impl Into<UserId>) -> Self {
        Self { user: user.into(), kind: TypingKind::Started }
    }

    /// `user` stopped typing.
    pub fn finished(user: impl Into<UserId>) -> Self {
        Self { user: user.into(), kind: TypingKind::Finished }
    }
}

/// Tracker configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Evict a user whose last `Started` is at least this old. `None` never
    /// evicts.
    pub idle_timeout: Option<Duration>,
}

impl TrackerConfig {
    /// Configuration with idle eviction after `timeout`.
    pub fn with_idle_timeout(timeout: Duration) -> Self {
        Self { idle_timeout: Some(timeout) }
    }
}

#[derive(Debug, Clone)]
struct Typist<I> {
    user: UserId,
    last_started: I,
}

/// Ordered set of users typing in one conversation.
///
/// Generic over the instant type so that idle eviction runs on virtual time in
/// simulation and `std::time::Instant` in production.
#[derive(Debug, Clone)]
pub struct TypingPresenceTracker<I> {
    session: Session,
    config: TrackerConfig,
    /// Conversation whose signals are applied. `None` until the first reset.
    conversation: Option<ConversationId>,
    typists: Vec<Typist<I>>,
}

impl<I> TypingPresenceTracker<I>
where
    I: Copy + Ord + std::ops::Sub<Output = Duration>,
{
    /// Create a tracker that is not yet following any conversation.
    pub fn new(session: Session, config: TrackerConfig) -> Self {
        Self { session, config, conversation: None, typists: Vec::new() }
    }

    /// Apply a typing signal scoped to `for_conversation`, received at `now`.
    ///
    /// Returns `true` if the set of typing users changed. Refreshing a user
    /// who is already typing is not a change.
    pub fn apply(
        &mut self,
        for_conversation: &ConversationId,
        signal: TypingSignal,
        now: I,
    ) -> bool {
        if self.conversation.as_ref() != Some(for_conversation) {
            tracing::trace!(
                conversation = %for_conversation,
                user = %signal.user,
                "ignoring typing signal for untracked conversation"
            );
            return false;
        }

        match signal.kind {
            TypingKind::Started => {
                if self.session.is_local(&signal.user) {
                    return false;
                }

                if let Some(typist) = self.typists.iter_mut().find(|t| t.user == signal.user) {
                    typist.last_started = now;
                    return false;
                }

                tracing::debug!(user = %signal.user, "user started typing");
                self.typists.push(Typist { user: signal.user, last_started: now });
                true
            },
            TypingKind::Finished => {
                let before = self.typists.len();
                self.typists.retain(|t| t.user != signal.user);

                let removed = self.typists.len() != before;
                if removed {
                    tracing::debug!(user = %signal.user, "user finished typing");
                }
                removed
            },
        }
    }

    /// Follow `conversation` and forget everyone who was typing.
    pub fn reset(&mut self, conversation: ConversationId) {
        tracing::debug!(%conversation, "typing tracker reset");
        self.conversation = Some(conversation);
        self.typists.clear();
    }

    /// Stop following any conversation.
    pub fn close(&mut self) {
        self.conversation = None;
        self.typists.clear();
    }

    /// Evict users idle for at least the configured timeout.
    ///
    /// Returns the evicted users in display order. No-op when no timeout is
    /// configured.
    pub fn expire(&mut self, now: I) -> Vec<UserId> {
        let Some(timeout) = self.config.idle_timeout else {
            return Vec::new();
        };

        let mut evicted = Vec::new();
        self.typists.retain(|typist| {
            let idle = now >= typist.last_started && now - typist.last_started >= timeout;
            if idle {
                evicted.push(typist.user.clone());
            }
            !idle
        });

        if !evicted.is_empty() {
            tracing::debug!(count = evicted.len(), "evicted idle typists");
        }
        evicted
    }

    /// Display text for the current snapshot.
    ///
    /// Empty when nobody is typing, `"<user> is typing"` for one user, and
    /// `"<u1>, <u2>, ... are typing"` in display order otherwise.
    pub fn render(&self) -> String {
        match self.typists.as_slice() {
            [] => String::new(),
            [only] => format!("{} is typing", only.user),
            many => {
                let names: Vec<&str> = many.iter().map(|t| t.user.as_str()).collect();
                format!("{} are typing", names.join(", "))
            },
        }
    }

    /// Users currently typing, in display order.
    pub fn typing_users(&self) -> impl Iterator<Item = &UserId> {
        self.typists.iter().map(|t| &t.user)
    }

    /// Whether `user` is currently typing.
    pub fn is_typing(&self, user: &UserId) -> bool {
        self.typists.iter().any(|t| &t.user == user)
    }

    /// Number of users currently typing.
    pub fn len(&self) -> usize {
        self.typists.len()
    }

    /// Whether nobody is typing.
    pub fn is_empty(&self) -> bool {
        self.typists.is_empty()
    }

    /// Conversation being followed. `None` before the first reset or after
    /// close.
    pub fn conversation(&self) -> Option<&ConversationId> {
        self.conversation.as_ref()
    }

    /// Session the tracker was built with.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Active configuration.
    pub fn config(&self) -> TrackerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn conv() -> ConversationId {
        ConversationId::new("conv-1")
    }

    fn tracker() -> TypingPresenceTracker<Instant> {
        let mut tracker = TypingPresenceTracker::new(Session::new("me"), TrackerConfig::default());
        tracker.reset(conv());
        tracker
    }

    #[test]
    fn single_user_renders_singular() {
        let mut t = tracker();
        assert!(t.apply(&conv(), TypingSignal::started("alice"), Instant::now()));

        assert_eq!(t.render(), "alice is typing");
    }

    #[test]
    fn several_users_render_comma_joined() {
        let mut t = tracker();
        let now = Instant::now();
        t.apply(&conv(), TypingSignal::started("alice"), now);
        t.apply(&conv(), TypingSignal::started("bob"), now);
        t.apply(&conv(), TypingSignal::started("carol"), now);

        assert_eq!(t.render(), "alice, bob, carol are typing");
    }

    #[test]
    fn finish_clears_text() {
        let mut t = tracker();
        let now = Instant::now();
        t.apply(&conv(), TypingSignal::started("alice"), now);
        assert!(t.apply(&conv(), TypingSignal::finished("alice"), now));

        assert_eq!(t.render(), "");
    }

    #[test]
    fn restart_keeps_position() {
        let mut t = tracker();
        let now = Instant::now();
        t.apply(&conv(), TypingSignal::started("alice"), now);
        t.apply(&conv(), TypingSignal::started("bob"), now);

        assert!(!t.apply(&conv(), TypingSignal::started("alice"), now));
        assert_eq!(t.render(), "alice, bob are typing");
    }

    #[test]
    fn finish_when_absent_is_noop() {
        let mut t = tracker();
        assert!(!t.apply(&conv(), TypingSignal::finished("ghost"), Instant::now()));
        assert!(t.is_empty());
    }

    #[test]
    fn other_conversation_ignored() {
        let mut t = tracker();
        let other = ConversationId::new("conv-2");

        assert!(!t.apply(&other, TypingSignal::started("alice"), Instant::now()));
        assert!(t.is_empty());
    }

    #[test]
    fn untracked_before_reset() {
        let mut t: TypingPresenceTracker<Instant> =
            TypingPresenceTracker::new(Session::new("me"), TrackerConfig::default());

        assert!(!t.apply(&conv(), TypingSignal::started("alice"), Instant::now()));
        assert_eq!(t.conversation(), None);
    }

    #[test]
    fn local_user_never_listed() {
        let mut t = tracker();
        assert!(!t.apply(&conv(), TypingSignal::started("ME"), Instant::now()));
        assert!(t.is_empty());
    }

    #[test]
    fn reset_clears_everyone() {
        let mut t = tracker();
        t.apply(&conv(), TypingSignal::started("alice"), Instant::now());

        t.reset(ConversationId::new("conv-2"));

        assert_eq!(t.render(), "");
        assert_eq!(t.conversation(), Some(&ConversationId::new("conv-2")));
    }

    #[test]
    fn close_stops_following() {
        let mut t = tracker();
        t.apply(&conv(), TypingSignal::started("alice"), Instant::now());
        t.close();

        assert!(t.is_empty());
        assert!(!t.apply(&conv(), TypingSignal::started("alice"), Instant::now()));
    }

    #[test]
    fn expire_without_timeout_keeps_everyone() {
        let mut t = tracker();
        let start = Instant::now();
        t.apply(&conv(), TypingSignal::started("alice"), start);

        assert!(t.expire(start + Duration::from_secs(3600)).is_empty());
        assert!(t.is_typing(&UserId::new("alice")));
    }

    #[test]
    fn expire_evicts_idle_and_keeps_order() {
        let config = TrackerConfig::with_idle_timeout(Duration::from_secs(5));
        let mut t = TypingPresenceTracker::new(Session::new("me"), config);
        t.reset(conv());

        let start = Instant::now();
        t.apply(&conv(), TypingSignal::started("alice"), start);
        t.apply(&conv(), TypingSignal::started("bob"), start);
        t.apply(&conv(), TypingSignal::started("carol"), start);
        t.apply(&conv(), TypingSignal::started("alice"), start + Duration::from_secs(3));
        t.apply(&conv(), TypingSignal::started("carol"), start + Duration::from_secs(4));

        let evicted = t.expire(start + Duration::from_secs(5));

        assert_eq!(evicted, vec![UserId::new("bob")]);
        assert_eq!(t.render(), "alice, carol are typing");
    }

    #[test]
    fn typing_kind_parses_case_insensitively() {
        assert_eq!("STARTED".parse::<TypingKind>(), Ok(TypingKind::Started));
        assert_eq!("finished".parse::<TypingKind>(), Ok(TypingKind::Finished));
        assert_eq!(
            "paused".parse::<TypingKind>(),
            Err(SignalError::UnknownKind { kind: "paused".to_string() })
        );
    }
}
