//! Fuzz target for aggregate delivery status
//!
//! Ensure best-of reduction over arbitrary rosters and receipts (MEDIUM
//! priority)
//!
//! # Strategy
//!
//! - Rosters: duplicates, the sender listed, recipients missing receipts
//! - Receipts: entries for users outside the roster
//! - Raw statuses: decoded from arbitrary strings
//!
//! # Invariants
//!
//! - Result is the maximum over roster members other than the sender
//! - Sent when nobody contributes
//! - Roster order never matters
//! - Messages from others always show Read to the viewer

#![no_main]

use std::collections::HashMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tidings_core::{DeliveryStatus, DeliveryStatusReducer, MessageReceipts, Session, UserId, reduce};

const PEOPLE: [&str; 5] = ["alice", "Alice", "bob", "carol", "dave"];

#[derive(Debug, Clone, Arbitrary)]
struct Scenario {
    sender: u8,
    roster: Vec<u8>,
    receipts: Vec<(u8, String)>,
}

fuzz_target!(|scenario: Scenario| {
    let sender = UserId::new(pick(scenario.sender));
    let roster: Vec<UserId> = scenario.roster.iter().map(|i| UserId::new(pick(*i))).collect();

    let mut statuses = HashMap::new();
    for (user, raw) in &scenario.receipts {
        if let Ok(status) = raw.parse::<DeliveryStatus>() {
            statuses.insert(UserId::new(pick(*user)), status);
        }
    }

    let result = reduce(&sender, &statuses, &roster);

    let expected = roster
        .iter()
        .filter(|member| !member.matches(&sender))
        .filter_map(|member| statuses.get(member).copied())
        .max()
        .unwrap_or(DeliveryStatus::Sent);
    assert_eq!(result, expected);

    let mut reversed = roster.clone();
    reversed.reverse();
    assert_eq!(reduce(&sender, &statuses, &reversed), result);

    let mut message = MessageReceipts::new("m", sender.clone(), 0);
    message.recipients = statuses;
    let viewer = DeliveryStatusReducer::new(Session::new("bob"));
    if !sender.matches(&UserId::new("bob")) {
        assert_eq!(viewer.status_for(&message, &roster), DeliveryStatus::Read);
    }
});

fn pick(index: u8) -> &'static str {
    PEOPLE[usize::from(index) % PEOPLE.len()]
}
