//! Conversation session manager.
//!
//! Owns the message log, the per-session usage counter, and the
//! reply-pending latch. Every change is written through to the
//! [`KeyValueStore`] as two whole entries (`chat` and `limit`), replacing
//! whatever was there. A change whose write was interrupted or failed stays
//! marked unsaved and is written by the next [`SessionManager::flush`].
//!
//! At most one user turn is in flight: a send is refused until the assistant
//! reply for the previous one has arrived. Replies carry no correlation id,
//! so the latch is what pairs them.

use std::sync::Arc;

use ragdesk_types::channel::Topic;
use ragdesk_types::chat::{ChatMessage, RejectReason, SendOutcome, SessionSnapshot};
use ragdesk_types::error::StorageError;
use tracing::{debug, info, warn};

use super::store::KeyValueStore;
use crate::channel::{EventChannel, Subscription};

/// Store key holding the JSON message array.
pub const CHAT_KEY: &str = "chat";

/// Store key holding the JSON usage counter.
pub const USAGE_KEY: &str = "limit";

/// Lower bound for the per-session message limit.
pub const MIN_CHAT_LIMIT: u32 = 1;

pub struct SessionManager<S: KeyValueStore, C: EventChannel> {
    store: S,
    channel: Arc<C>,
    inbound: Subscription,
    limit: u32,
    messages: Vec<ChatMessage>,
    used_count: u32,
    /// Id of the user message still waiting for its reply.
    pending: Option<String>,
    /// In-memory state differs from the persisted snapshot.
    unsaved: bool,
}

impl<S: KeyValueStore, C: EventChannel> SessionManager<S, C> {
    /// Create an empty session and subscribe to assistant replies.
    ///
    /// Call [`hydrate`](Self::hydrate) to restore persisted state.
    pub fn new(store: S, channel: Arc<C>, limit: u32) -> Self {
        let inbound = channel.subscribe(Topic::AssistantMessage);
        Self {
            store,
            channel,
            inbound,
            limit: limit.max(MIN_CHAT_LIMIT),
            messages: Vec::new(),
            used_count: 0,
            pending: None,
            unsaved: false,
        }
    }

    /// Load the persisted log and usage counter.
    ///
    /// Each entry is read independently; a missing or malformed entry falls
    /// back to its empty value. The pending latch is always cleared.
    pub async fn hydrate(&mut self) {
        self.messages = match self.store.get(CHAT_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "malformed persisted chat log, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read persisted chat log");
                Vec::new()
            }
        };

        self.used_count = match self.store.get(USAGE_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "malformed persisted usage counter, resetting to 0");
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                warn!(error = %e, "failed to read persisted usage counter");
                0
            }
        };

        self.pending = None;
        self.unsaved = false;
        info!(
            messages = self.messages.len(),
            used_count = self.used_count,
            limit = self.limit,
            "hydrated chat session"
        );
    }

    /// Send a user message to the assistant.
    ///
    /// Rejected without side effects when the text is blank, the limit is
    /// reached, a reply is pending, or the channel refuses the emit.
    pub async fn send_user_message(&mut self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Rejected(RejectReason::EmptyMessage);
        }
        if self.has_reached_limit() {
            debug!(used_count = self.used_count, limit = self.limit, "chat limit reached");
            return SendOutcome::Rejected(RejectReason::LimitReached);
        }
        if self.pending.is_some() {
            debug!("previous reply still pending, send ignored");
            return SendOutcome::Rejected(RejectReason::ReplyPending);
        }

        if let Err(e) = self.channel.emit(Topic::ClientMessage, text) {
            warn!(error = %e, "failed to emit user message");
            return SendOutcome::Rejected(RejectReason::ChannelClosed);
        }

        let message = ChatMessage::user(text);
        self.messages.push(message.clone());
        self.used_count += 1;
        self.pending = Some(message.id.clone());
        self.unsaved = true;
        debug!(
            message_id = %message.id,
            used_count = self.used_count,
            "user message sent"
        );

        self.flush().await;
        SendOutcome::Sent(message)
    }

    /// Wait for the next assistant reply payload. Cancel-safe.
    ///
    /// `None` once the session is closed or the channel has gone away.
    pub async fn recv_reply(&mut self) -> Option<String> {
        self.inbound.recv().await
    }

    /// Record an assistant reply and persist the session.
    pub async fn on_assistant_reply(&mut self, text: &str) -> ChatMessage {
        let message = self.record_assistant_reply(text);
        self.flush().await;
        message
    }

    /// Append an assistant reply and clear the latch without persisting.
    ///
    /// Replies are never deduplicated. The change is written by the next
    /// [`flush`](Self::flush).
    pub fn record_assistant_reply(&mut self, text: &str) -> ChatMessage {
        let message = ChatMessage::assistant(text);
        self.messages.push(message.clone());
        if let Some(answered) = self.pending.take() {
            debug!(reply_to = %answered, message_id = %message.id, "assistant reply received");
        } else {
            debug!(message_id = %message.id, "unsolicited assistant reply received");
        }
        self.unsaved = true;
        message
    }

    /// Persist unsaved changes, logging a failure.
    ///
    /// No-op when nothing changed since the last successful write. Cancel-safe:
    /// an interrupted write leaves the session unsaved for the next call.
    pub async fn flush(&mut self) {
        if !self.unsaved {
            return;
        }
        match self.persist().await {
            Ok(()) => self.unsaved = false,
            Err(e) => warn!(error = %e, "failed to persist chat session"),
        }
    }

    /// Whether in-memory state has not been written yet.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Overwrite the persisted snapshot with the in-memory state.
    pub async fn persist(&self) -> Result<(), StorageError> {
        let chat = serde_json::to_string(&self.messages)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let usage = serde_json::to_string(&self.used_count)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.store.set(CHAT_KEY, &chat).await?;
        self.store.set(USAGE_KEY, &usage).await?;
        Ok(())
    }

    /// Clear the log, the usage counter, the latch, and the persisted copy.
    pub async fn reset(&mut self) {
        self.messages.clear();
        self.used_count = 0;
        self.pending = None;
        self.unsaved = false;

        for key in [CHAT_KEY, USAGE_KEY] {
            if let Err(e) = self.store.remove(key).await {
                warn!(key, error = %e, "failed to remove persisted session entry");
            }
        }
        info!("chat session reset");
    }

    /// Release the assistant reply subscription.
    pub fn close(&mut self) {
        self.inbound.close();
    }

    /// Messages in chronological order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// User messages sent since the last reset.
    pub fn used_count(&self) -> u32 {
        self.used_count
    }

    /// Per-session message limit.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Sends left before the limit is reached.
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used_count)
    }

    /// Whether further sends are refused.
    pub fn has_reached_limit(&self) -> bool {
        self.used_count >= self.limit
    }

    /// Whether a sent message is still waiting for its reply.
    pub fn reply_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Copy of the state that gets persisted.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.messages.clone(),
            used_count: self.used_count,
        }
    }
}

impl<S: KeyValueStore, C: EventChannel> std::fmt::Debug for SessionManager<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("messages", &self.messages.len())
            .field("used_count", &self.used_count)
            .field("limit", &self.limit)
            .field("reply_pending", &self.pending.is_some())
            .field("unsaved", &self.unsaved)
            .finish()
    }
}
