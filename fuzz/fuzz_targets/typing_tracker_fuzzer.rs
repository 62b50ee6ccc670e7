//! Fuzz target for the typing presence tracker
//!
//! Keep the typing line consistent under arbitrary signal streams (HIGH
//! priority)
//!
//! # Strategy
//!
//! - Raw kinds: typing kinds decoded from arbitrary strings
//! - Identity: the local user under varying letter case
//! - Conversations: signals for the tracked and untracked conversations
//! - Time: arbitrary gaps between signals, with idle eviction enabled
//!
//! # Invariants
//!
//! - The local user is never listed as typing
//! - No user is listed twice
//! - Signals for other conversations never change the list
//! - `render()` agrees with the list
//! - NEVER panic on an unknown kind

#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tidings_core::{
    ConversationId, Session, TrackerConfig, TypingKind, TypingPresenceTracker, TypingSignal,
    UserId,
};

const PEOPLE: [&str; 5] = ["alice", "ALICE", "bob", "carol", "dave"];

#[derive(Debug, Clone, Arbitrary)]
enum TrackerOp {
    Signal { user: u8, kind: String, tracked: bool, gap_ms: u16 },
    Expire { gap_ms: u16 },
    Reset,
    Close,
}

fuzz_target!(|ops: Vec<TrackerOp>| {
    let tracked = ConversationId::new("tracked");
    let untracked = ConversationId::new("untracked");
    let config = TrackerConfig::with_idle_timeout(Duration::from_millis(500));
    let mut tracker: TypingPresenceTracker<Duration> =
        TypingPresenceTracker::new(Session::new("alice"), config);
    tracker.reset(tracked.clone());

    let mut now = Duration::ZERO;

    for op in ops {
        match op {
            TrackerOp::Signal { user, kind, tracked: to_tracked, gap_ms } => {
                now += Duration::from_millis(u64::from(gap_ms));

                let Ok(kind) = kind.parse::<TypingKind>() else {
                    continue;
                };
                let signal = TypingSignal { user: UserId::new(pick(user)), kind };

                if to_tracked {
                    let _ = tracker.apply(&tracked, signal, now);
                } else {
                    let before = snapshot(&tracker);
                    assert!(!tracker.apply(&untracked, signal, now));
                    assert_eq!(before, snapshot(&tracker));
                }
            },
            TrackerOp::Expire { gap_ms } => {
                now += Duration::from_millis(u64::from(gap_ms));
                let _ = tracker.expire(now);
            },
            TrackerOp::Reset => {
                tracker.reset(tracked.clone());
                assert_eq!(tracker.render(), "");
            },
            TrackerOp::Close => {
                tracker.close();
                assert!(tracker.is_empty());
                tracker.reset(tracked.clone());
            },
        }

        check(&tracker);
    }
});

fn pick(index: u8) -> &'static str {
    PEOPLE[usize::from(index) % PEOPLE.len()]
}

fn snapshot(tracker: &TypingPresenceTracker<Duration>) -> Vec<UserId> {
    tracker.typing_users().cloned().collect()
}

fn check(tracker: &TypingPresenceTracker<Duration>) {
    let users = snapshot(tracker);
    let local = UserId::new("alice");

    assert!(users.iter().all(|u| !u.matches(&local)), "local user listed: {users:?}");

    for (i, user) in users.iter().enumerate() {
        assert!(!users[i + 1..].contains(user), "{user} listed twice");
    }

    let names: Vec<&str> = users.iter().map(UserId::as_str).collect();
    let expected = match names.as_slice() {
        [] => String::new(),
        [one] => format!("{one} is typing"),
        many => format!("{} are typing", many.join(", ")),
    };
    assert_eq!(tracker.render(), expected);
}
