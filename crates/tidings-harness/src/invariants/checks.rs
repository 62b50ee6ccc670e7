//! Standard invariant checks.
//!
//! These invariants capture behavioral properties of the conversation view
//! that must hold after every event, whatever order events arrive in.

use std::collections::HashSet;

use tidings_core::DeliveryStatus;

use super::{Invariant, InvariantKind, InvariantResult, SystemSnapshot, Violation};

/// The local user is never shown as typing.
///
/// Our own typing echo comes back from the backend like anyone else's and
/// must be filtered out before it reaches the indicator.
pub struct NoSelfTyping;

impl Invariant for NoSelfTyping {
    fn kind(&self) -> InvariantKind {
        InvariantKind::NoSelfTyping
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for view in &state.views {
            if view.typing.iter().any(|user| user.matches(&view.local_user)) {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "view of {}: local user in typing list {:?}",
                        view.local_user, view.typing
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Each user appears at most once in the typing list.
pub struct NoDuplicateTypists;

impl Invariant for NoDuplicateTypists {
    fn kind(&self) -> InvariantKind {
        InvariantKind::NoDuplicateTypists
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for view in &state.views {
            let mut seen = HashSet::new();
            for user in &view.typing {
                if !seen.insert(user) {
                    return Err(Violation {
                        invariant: self.kind(),
                        message: format!("view of {}: {} listed twice", view.local_user, user),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Nobody is typing when no conversation is displayed.
pub struct NoTypingWithoutConversation;

impl Invariant for NoTypingWithoutConversation {
    fn kind(&self) -> InvariantKind {
        InvariantKind::NoTypingWithoutConversation
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for view in &state.views {
            if view.conversation.is_none() && !view.typing.is_empty() {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "view of {}: no conversation open but {:?} typing",
                        view.local_user, view.typing
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The rendered line is exactly what the typing list implies.
///
/// Empty for no typists, "X is typing" for one, and the comma-joined names
/// followed by "are typing" for several.
pub struct TypingTextMatchesUsers;

impl Invariant for TypingTextMatchesUsers {
    fn kind(&self) -> InvariantKind {
        InvariantKind::TypingTextMatchesUsers
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for view in &state.views {
            let names: Vec<&str> = view.typing.iter().map(|u| u.as_str()).collect();
            let expected = match names.as_slice() {
                [] => String::new(),
                [one] => format!("{one} is typing"),
                many => format!("{} are typing", many.join(", ")),
            };

            if view.typing_text != expected {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "view of {}: rendered {:?}, expected {:?}",
                        view.local_user, view.typing_text, expected
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Messages are displayed in position order, each id once.
pub struct MessagesOrdered;

impl Invariant for MessagesOrdered {
    fn kind(&self) -> InvariantKind {
        InvariantKind::MessagesOrdered
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for view in &state.views {
            for window in view.messages.windows(2) {
                if window[1].position < window[0].position {
                    return Err(Violation {
                        invariant: self.kind(),
                        message: format!(
                            "view of {}: {} at {} shown after {} at {}",
                            view.local_user,
                            window[1].id,
                            window[1].position,
                            window[0].id,
                            window[0].position
                        ),
                    });
                }
            }

            let mut seen = HashSet::new();
            for message in &view.messages {
                if !seen.insert(&message.id) {
                    return Err(Violation {
                        invariant: self.kind(),
                        message: format!("view of {}: {} shown twice", view.local_user, message.id),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A message somebody else sent always shows as read to us.
pub struct ForeignMessagesRead;

impl Invariant for ForeignMessagesRead {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ForeignMessagesRead
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for view in &state.views {
            let unread = view.messages.iter().find(|m| {
                !m.sender.matches(&view.local_user) && m.status != DeliveryStatus::Read
            });

            if let Some(message) = unread {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "view of {}: {} from {} shows {}",
                        view.local_user, message.id, message.sender, message.status
                    ),
                });
            }
        }
        Ok(())
    }
}
