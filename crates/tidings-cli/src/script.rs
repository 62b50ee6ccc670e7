//! JSON-lines event script.
//!
//! One JSON object per line, tagged by `"event"`. Blank lines and lines
//! starting with `#` are skipped.
//!
//! ```text
//! {"event": "open", "conversation": "team", "roster": ["alice", "bob"]}
//! {"event": "typing", "conversation": "team", "user": "bob", "kind": "started"}
//! {"event": "pause", "ms": 1500}
//! {"event": "send", "text": "on my way"}
//! {"event": "message", "conversation": "team", "id": "m1", "sender": "alice",
//!  "position": 1, "recipients": {"bob": "delivered"}}
//! ```

use std::{collections::HashMap, time::Duration};

use serde::Deserialize;
use tidings_app::AppEvent;
use tidings_core::{
    ConversationId, ConversationMetadata, DeliveryStatus, MessageId, MessageReceipts, TypingKind,
    TypingSignal, UserId,
};

use crate::ReplayError;

/// One decoded script line.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ScriptLine {
    Open {
        conversation: ConversationId,
        #[serde(default)]
        roster: Vec<UserId>,
        #[serde(default)]
        metadata: ConversationMetadata,
    },
    Close {
        conversation: ConversationId,
    },
    /// `kind` stays a raw string so a bad value is reported as a signal
    /// error rather than a parse error.
    Typing {
        conversation: ConversationId,
        user: UserId,
        kind: String,
    },
    Message {
        conversation: ConversationId,
        id: MessageId,
        sender: UserId,
        position: u64,
        #[serde(default)]
        recipients: HashMap<UserId, DeliveryStatus>,
    },
    Remove {
        conversation: ConversationId,
        id: MessageId,
    },
    Metadata {
        conversation: ConversationId,
        metadata: ConversationMetadata,
    },
    SyncStarted,
    SyncCompleted,
    SyncFailed {
        #[serde(default)]
        errors: Vec<String>,
    },
    ComposerEdited,
    ComposerCleared,
    Send {
        text: String,
    },
    HeaderTapped,
    Tick,
    Pause {
        ms: u64,
    },
}

/// What a script line asks the driver to do.
#[derive(Debug, Clone)]
pub enum Step<I> {
    /// Feed an event to the App. Typing events carry no timestamp yet; the
    /// driver stamps them on delivery.
    Event(PendingEvent<I>),
    /// Wait before reading the next line.
    Pause(Duration),
}

/// Event decoded from a script, waiting for its delivery time.
#[derive(Debug, Clone)]
pub enum PendingEvent<I> {
    /// Typing signal, stamped with the delivery instant.
    Typing {
        /// Conversation the signal belongs to.
        conversation: ConversationId,
        /// Who started or stopped typing.
        signal: TypingSignal,
    },
    /// Tick, stamped with the delivery instant.
    Tick,
    /// Any event that needs no timestamp.
    Ready(AppEvent<I>),
}

impl<I> PendingEvent<I> {
    /// Produce the App event as delivered at `now`.
    pub fn stamp(self, now: I) -> AppEvent<I> {
        match self {
            Self::Typing { conversation, signal } => {
                AppEvent::Typing { conversation, signal, at: now }
            },
            Self::Tick => AppEvent::Tick { now },
            Self::Ready(event) => event,
        }
    }
}

/// Decode script line number `line` (1-based).
///
/// Returns `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// - [`ReplayError::Decode`] if the line is not a known script entry
/// - [`ReplayError::Signal`] if a typing entry names an unknown kind
pub fn decode_line<I>(line: usize, text: &str) -> Result<Option<Step<I>>, ReplayError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let entry: ScriptLine =
        serde_json::from_str(text).map_err(|source| ReplayError::Decode { line, source })?;

    let step = match entry {
        ScriptLine::Open { conversation, roster, metadata } => {
            ready(AppEvent::ConversationOpened { conversation, roster, metadata })
        },
        ScriptLine::Close { conversation } => ready(AppEvent::ConversationClosed { conversation }),
        ScriptLine::Typing { conversation, user, kind } => {
            let kind: TypingKind =
                kind.parse().map_err(|source| ReplayError::Signal { line, source })?;
            let signal = TypingSignal { user, kind };
            Step::Event(PendingEvent::Typing { conversation, signal })
        },
        ScriptLine::Message { conversation, id, sender, position, recipients } => {
            let message = MessageReceipts { id, sender, position, recipients };
            ready(AppEvent::MessageUpserted { conversation, message })
        },
        ScriptLine::Remove { conversation, id } => {
            ready(AppEvent::MessageRemoved { conversation, message: id })
        },
        ScriptLine::Metadata { conversation, metadata } => {
            ready(AppEvent::MetadataChanged { conversation, metadata })
        },
        ScriptLine::SyncStarted => ready(AppEvent::SyncStarted),
        ScriptLine::SyncCompleted => ready(AppEvent::SyncCompleted),
        ScriptLine::SyncFailed { errors } => ready(AppEvent::SyncFailed { errors }),
        ScriptLine::ComposerEdited => ready(AppEvent::ComposerEdited),
        ScriptLine::ComposerCleared => ready(AppEvent::ComposerCleared),
        ScriptLine::Send { text } => ready(AppEvent::MessageSent { text }),
        ScriptLine::HeaderTapped => ready(AppEvent::HeaderTapped),
        ScriptLine::Tick => Step::Event(PendingEvent::Tick),
        ScriptLine::Pause { ms } => Step::Pause(Duration::from_millis(ms)),
    };

    Ok(Some(step))
}

fn ready<I>(event: AppEvent<I>) -> Step<I> {
    Step::Event(PendingEvent::Ready(event))
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use tidings_core::SignalError;

    use super::*;

    fn decode(text: &str) -> Result<Option<Step<Instant>>, ReplayError> {
        decode_line(7, text)
    }

    #[test]
    fn blank_and_comment_lines_skipped() {
        assert!(matches!(decode("   "), Ok(None)));
        assert!(matches!(decode("# setup"), Ok(None)));
    }

    #[test]
    fn typing_kind_is_case_insensitive() {
        let step = decode(r#"{"event":"typing","conversation":"c","user":"bob","kind":"STARTED"}"#);

        let Ok(Some(Step::Event(PendingEvent::Typing { signal, .. }))) = step else {
            unreachable!("expected typing step");
        };
        assert_eq!(signal, TypingSignal::started("bob"));
    }

    #[test]
    fn unknown_typing_kind_rejected_with_line() {
        let err = decode(r#"{"event":"typing","conversation":"c","user":"bob","kind":"paused"}"#);

        let Err(ReplayError::Signal { line, source }) = err else {
            unreachable!("expected signal error");
        };
        assert_eq!(line, 7);
        assert_eq!(source, SignalError::UnknownKind { kind: "paused".into() });
    }

    #[test]
    fn malformed_json_rejected_with_line() {
        let err = decode(r#"{"event":"open""#);

        assert!(matches!(err, Err(ReplayError::Decode { line: 7, .. })));
    }

    #[test]
    fn message_receipts_decoded() {
        let step = decode(
            r#"{"event":"message","conversation":"c","id":"m1","sender":"alice","position":3,
                "recipients":{"bob":"delivered","carol":"read"}}"#,
        );

        let Ok(Some(Step::Event(PendingEvent::Ready(AppEvent::MessageUpserted { message, .. })))) =
            step
        else {
            unreachable!("expected message step");
        };
        assert_eq!(
            message,
            MessageReceipts::new("m1", "alice", 3)
                .with_status("bob", DeliveryStatus::Delivered)
                .with_status("carol", DeliveryStatus::Read)
        );
    }

    #[test]
    fn send_decoded() {
        let step = decode(r#"{"event":"send","text":"on my way"}"#);

        let Ok(Some(Step::Event(PendingEvent::Ready(AppEvent::MessageSent { text })))) = step else {
            unreachable!("expected send step");
        };
        assert_eq!(text, "on my way");
    }

    #[test]
    fn pause_decoded() {
        let step = decode(r#"{"event":"pause","ms":250}"#);

        assert!(matches!(step, Ok(Some(Step::Pause(d))) if d == Duration::from_millis(250)));
    }
}
