//! Chat message and session snapshot types.
//!
//! A conversation is an append-only log of [`ChatMessage`] values plus a
//! usage counter debited once per user message. Both are persisted together
//! as a [`SessionSnapshot`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message in the conversation log.
///
/// The `id` is opaque: freshly created messages use a UUIDv7 string, but
/// ids restored from storage are kept verbatim. Ordering is by position in
/// the log, never by `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message authored by the user, stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content.into())
    }

    /// Create a message authored by the assistant, stamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content.into())
    }

    fn new(role: MessageRole, content: String) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            role,
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// Persisted state of a conversation session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub messages: Vec<ChatMessage>,
    pub used_count: u32,
}

/// Why a user message was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The text was empty or whitespace-only.
    EmptyMessage,
    /// The usage counter has reached the session limit.
    LimitReached,
    /// A previous user turn is still waiting for its reply.
    ReplyPending,
    /// The event channel refused the outbound message.
    ChannelClosed,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::EmptyMessage => write!(f, "empty message"),
            RejectReason::LimitReached => write!(f, "chat limit reached"),
            RejectReason::ReplyPending => write!(f, "reply pending"),
            RejectReason::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

/// Result of asking the session manager to send a user message.
///
/// Rejections are ordinary values; callers precondition-check via the
/// session's read state or inspect the reason here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent(ChatMessage),
    Rejected(RejectReason),
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            let parsed: MessageRole = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
        assert!("system".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_message_role_serde() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_persisted_message_with_opaque_id() {
        let raw = r#"{"id":"1","role":"user","content":"hi","timestamp":"2024-01-01T00:00:00Z"}"#;
        let msg: ChatMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.id, "1");
        assert!(msg.is_user());
        assert_eq!(msg.timestamp.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_millisecond_timestamps_parse() {
        // Browser `Date` JSON carries milliseconds.
        let raw = r#"{"id":"a","role":"assistant","content":"x","timestamp":"2024-05-02T10:11:12.345Z"}"#;
        let msg: ChatMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.role, MessageRole::Assistant);
    }

    #[test]
    fn test_new_messages_get_distinct_ids() {
        let a = ChatMessage::user("one");
        let b = ChatMessage::user("two");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_send_outcome_is_sent() {
        assert!(SendOutcome::Sent(ChatMessage::user("x")).is_sent());
        assert!(!SendOutcome::Rejected(RejectReason::LimitReached).is_sent());
    }
}
