//! Property tests for the invariant checks and the simulated environment.
//!
//! Views built from a real tracker must pass every check; views with a stale
//! typing line or misordered messages must not.

use std::time::Duration;

use proptest::prelude::*;
use tidings_core::{
    ConversationId, DeliveryStatus, Environment, MessageId, Session, TrackerConfig,
    TypingPresenceTracker, TypingSignal, UserId,
};
use tidings_harness::{
    InvariantRegistry, MessageSnapshot, SimEnv, SimInstant, SystemSnapshot, ViewSnapshot,
};

const PEOPLE: [&str; 5] = ["alice", "bob", "carol", "dave", "Alice"];

/// View for "alice" whose typing state comes from a real tracker.
fn tracked_view(signals: &[(usize, bool)]) -> ViewSnapshot {
    let conversation = ConversationId::new("team");
    let mut tracker: TypingPresenceTracker<SimInstant> =
        TypingPresenceTracker::new(Session::new("alice"), TrackerConfig::default());
    tracker.reset(conversation.clone());

    for (user, started) in signals {
        let signal = if *started {
            TypingSignal::started(PEOPLE[*user])
        } else {
            TypingSignal::finished(PEOPLE[*user])
        };
        let _ = tracker.apply(&conversation, signal, SimInstant::default());
    }

    let mut view = ViewSnapshot::new("alice").with_conversation(conversation);
    view.typing = tracker.typing_users().cloned().collect();
    view.typing_text = tracker.render();
    view
}

fn message(index: usize, position: u64) -> MessageSnapshot {
    MessageSnapshot {
        id: MessageId::new(format!("m{index}")),
        sender: UserId::new("alice"),
        position,
        status: DeliveryStatus::Sent,
    }
}

proptest! {
    #[test]
    fn prop_tracker_states_pass_every_check(
        signals in prop::collection::vec((0..PEOPLE.len(), any::<bool>()), 0..40),
    ) {
        let snapshot = SystemSnapshot::single(tracked_view(&signals));

        prop_assert!(InvariantRegistry::standard().check_all(&snapshot).is_ok());
    }

    #[test]
    fn prop_stale_typing_text_rejected(
        signals in prop::collection::vec((1..4usize, Just(true)), 1..10),
    ) {
        let mut view = tracked_view(&signals);
        view.typing_text.push('!');

        let snapshot = SystemSnapshot::single(view);
        prop_assert!(InvariantRegistry::standard().check_all(&snapshot).is_err());
    }

    #[test]
    fn prop_sorted_messages_accepted(
        mut positions in prop::collection::vec(0u64..20, 0..15),
    ) {
        positions.sort_unstable();
        let mut view = ViewSnapshot::new("alice").with_conversation("team");
        for (i, position) in positions.into_iter().enumerate() {
            view = view.with_message(message(i, position));
        }

        let snapshot = SystemSnapshot::single(view);
        prop_assert!(InvariantRegistry::standard().check_all(&snapshot).is_ok());
    }

    #[test]
    fn prop_out_of_order_message_rejected(
        low in 0u64..10,
        gap in 1u64..10,
    ) {
        let view = ViewSnapshot::new("alice")
            .with_conversation("team")
            .with_message(message(0, low + gap))
            .with_message(message(1, low));

        let snapshot = SystemSnapshot::single(view);
        prop_assert!(InvariantRegistry::standard().check_all(&snapshot).is_err());
    }

    #[test]
    fn prop_same_seed_same_colors(seed in any::<u64>()) {
        let (a, b) = (SimEnv::with_seed(seed), SimEnv::with_seed(seed));
        let (mut left, mut right) = ([0u8; 12], [0u8; 12]);

        a.random_bytes(&mut left);
        b.random_bytes(&mut right);

        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_clock_sums_advances(steps in prop::collection::vec(0u64..5_000, 0..20)) {
        let env = SimEnv::with_seed(0);
        let shared = env.clone();

        for ms in &steps {
            env.advance(Duration::from_millis(*ms));
        }

        let total: u64 = steps.iter().sum();
        prop_assert_eq!(shared.now().since_start(), Duration::from_millis(total));
    }
}
