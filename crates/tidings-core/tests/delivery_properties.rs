//! Property-based tests for delivery status reduction.

use std::collections::HashMap;

use proptest::prelude::*;
use tidings_core::{DeliveryStatus, DeliveryStatusReducer, MessageReceipts, Session, UserId, reduce};

const PEOPLE: [&str; 6] = ["alice", "bob", "carol", "dave", "erin", "frank"];

fn status_strategy() -> impl Strategy<Value = DeliveryStatus> {
    prop_oneof![
        Just(DeliveryStatus::Sent),
        Just(DeliveryStatus::Delivered),
        Just(DeliveryStatus::Read),
    ]
}

fn roster_strategy() -> impl Strategy<Value = Vec<UserId>> {
    prop::sample::subsequence(PEOPLE.to_vec(), 0..=PEOPLE.len())
        .prop_shuffle()
        .prop_map(|names| names.into_iter().map(UserId::new).collect())
}

fn statuses_strategy() -> impl Strategy<Value = HashMap<UserId, DeliveryStatus>> {
    prop::collection::vec(prop::option::of(status_strategy()), PEOPLE.len()).prop_map(|slots| {
        PEOPLE
            .iter()
            .zip(slots)
            .filter_map(|(name, status)| status.map(|s| (UserId::new(*name), s)))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_reduce_is_best_contributing_status(
        sender in prop::sample::select(PEOPLE.to_vec()).prop_map(UserId::new),
        statuses in statuses_strategy(),
        roster in roster_strategy(),
    ) {
        let expected = roster
            .iter()
            .filter(|p| !p.matches(&sender))
            .filter_map(|p| statuses.get(p).copied())
            .max()
            .unwrap_or(DeliveryStatus::Sent);

        prop_assert_eq!(reduce(&sender, &statuses, &roster), expected);
    }

    #[test]
    fn prop_reduce_ignores_roster_order(
        statuses in statuses_strategy(),
        roster in roster_strategy(),
    ) {
        let sender = UserId::new("alice");
        let mut reversed = roster.clone();
        reversed.reverse();

        prop_assert_eq!(reduce(&sender, &statuses, &roster), reduce(&sender, &statuses, &reversed));
    }

    #[test]
    fn prop_foreign_messages_always_read(
        sender in prop::sample::select(PEOPLE[1..].to_vec()),
        statuses in statuses_strategy(),
        roster in roster_strategy(),
    ) {
        let reducer = DeliveryStatusReducer::new(Session::new("alice"));
        let mut message = MessageReceipts::new("m", sender, 0);
        message.recipients = statuses;

        prop_assert_eq!(reducer.status_for(&message, &roster), DeliveryStatus::Read);
    }
}

#[test]
fn scenario_delivered_beats_sent() {
    let statuses: HashMap<UserId, DeliveryStatus> = [
        (UserId::new("bob"), DeliveryStatus::Delivered),
        (UserId::new("carol"), DeliveryStatus::Sent),
    ]
    .into_iter()
    .collect();

    let result =
        reduce(&UserId::new("alice"), &statuses, &[UserId::new("bob"), UserId::new("carol")]);

    assert_eq!(result, DeliveryStatus::Delivered);
}

#[test]
fn scenario_read_dominates() {
    let statuses: HashMap<UserId, DeliveryStatus> = [
        (UserId::new("bob"), DeliveryStatus::Read),
        (UserId::new("carol"), DeliveryStatus::Sent),
    ]
    .into_iter()
    .collect();

    let result =
        reduce(&UserId::new("alice"), &statuses, &[UserId::new("carol"), UserId::new("bob")]);

    assert_eq!(result, DeliveryStatus::Read);
}
