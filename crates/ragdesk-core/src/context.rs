//! Client context: the one object a front end talks to.
//!
//! Created once at startup, it owns the chat session, the ingestion tracker,
//! the upload dispatcher, the source list, and the selected assistant
//! profile. All of them share a single event channel.

use std::sync::Arc;
use std::time::Duration;

use ragdesk_types::agent::AgentProfile;
use ragdesk_types::chat::{ChatMessage, SendOutcome};
use ragdesk_types::config::ClientConfig;
use ragdesk_types::ingest::IngestionProgress;
use ragdesk_types::source::{IndexResponse, SourceRef, Submission};
use tracing::{debug, info};

use crate::channel::EventChannel;
use crate::chat::{KeyValueStore, SessionManager};
use crate::ingest::{IngestionTracker, TrackerConfig};
use crate::upload::{IndexingClient, SourceList, UploadDispatcher};

/// Settings the context needs from the client configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextSettings {
    pub chat_limit: u32,
    pub tracker: TrackerConfig,
}

impl ContextSettings {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            chat_limit: config.chat_limit,
            tracker: TrackerConfig {
                completion_grace: Duration::from_millis(config.completion_grace_ms),
                idle_timeout: config.stage_idle_timeout_secs.map(Duration::from_secs),
            },
        }
    }
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

/// Something the front end should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// An assistant reply, already appended to the log.
    AssistantReply(ChatMessage),
    /// The ingestion tracker changed state.
    Progress(IngestionProgress),
}

pub struct ClientContext<S: KeyValueStore, C: EventChannel, I: IndexingClient> {
    channel: Arc<C>,
    session: SessionManager<S, C>,
    tracker: IngestionTracker<C>,
    dispatcher: UploadDispatcher<I>,
    sources: SourceList,
    agent: AgentProfile,
    /// Reply already in the log but not yet handed to the caller.
    undelivered_reply: Option<ChatMessage>,
}

impl<S, C, I> ClientContext<S, C, I>
where
    S: KeyValueStore,
    C: EventChannel,
    I: IndexingClient,
{
    /// Build the context and hydrate the session from `store`.
    pub async fn init(store: S, channel: Arc<C>, indexer: I, settings: ContextSettings) -> Self {
        let mut session = SessionManager::new(store, Arc::clone(&channel), settings.chat_limit);
        session.hydrate().await;
        let tracker = IngestionTracker::new(Arc::clone(&channel), settings.tracker);

        info!(limit = session.limit(), "client context initialized");
        Self {
            channel,
            session,
            tracker,
            dispatcher: UploadDispatcher::new(indexer),
            sources: SourceList::new(),
            agent: AgentProfile::default(),
            undelivered_reply: None,
        }
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    pub async fn send_message(&mut self, text: &str) -> SendOutcome {
        self.session.send_user_message(text).await
    }

    pub async fn clear_history(&mut self) {
        self.session.reset().await;
    }

    /// Submit a source for indexing and record it in the source list.
    ///
    /// The entry is kept even when indexing fails. Empty submissions are
    /// answered with a failure and not recorded.
    pub async fn add_source(&mut self, submission: Submission) -> IndexResponse {
        let response = self.dispatcher.submit(&submission, &mut self.tracker).await;
        if !submission.is_empty() {
            self.sources.push(submission.source_ref());
            self.refresh_agent();
        }
        response
    }

    pub fn remove_source(&mut self, index: usize) -> Option<SourceRef> {
        let removed = self.sources.remove(index)?;
        debug!(label = %removed.label, "source removed");
        self.refresh_agent();
        Some(removed)
    }

    pub fn cancel_ingestion(&mut self) {
        self.tracker.cancel();
    }

    /// Select an assistant profile by hand.
    pub fn set_agent(&mut self, agent: AgentProfile) {
        self.agent = agent;
    }

    // -----------------------------------------------------------------------
    // Event pump
    // -----------------------------------------------------------------------

    /// Wait for the next assistant reply or ingestion update.
    ///
    /// Returns `None` once the reply stream has ended (channel gone or
    /// context shut down).
    ///
    /// Cancel-safe: a reply is recorded in the log before anything is
    /// awaited. If the call is dropped while that reply is being persisted,
    /// the next call finishes the write and returns it.
    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        self.session.flush().await;
        if let Some(message) = self.undelivered_reply.take() {
            return Some(ClientEvent::AssistantReply(message));
        }

        let text = tokio::select! {
            reply = self.session.recv_reply() => reply?,
            progress = self.tracker.next_update() => {
                return Some(ClientEvent::Progress(progress));
            }
        };
        self.undelivered_reply = Some(self.session.record_assistant_reply(&text));
        self.session.flush().await;
        self.undelivered_reply.take().map(ClientEvent::AssistantReply)
    }

    /// Release every subscription held by the context.
    pub fn shutdown(&mut self) {
        self.tracker.cancel();
        self.session.close();
        info!("client context shut down");
    }

    // -----------------------------------------------------------------------
    // Read state
    // -----------------------------------------------------------------------

    pub fn session(&self) -> &SessionManager<S, C> {
        &self.session
    }

    pub fn tracker(&self) -> &IngestionTracker<C> {
        &self.tracker
    }

    pub fn sources(&self) -> &SourceList {
        &self.sources
    }

    pub fn agent(&self) -> AgentProfile {
        self.agent
    }

    pub fn channel(&self) -> &Arc<C> {
        &self.channel
    }

    fn refresh_agent(&mut self) {
        if let Some(agent) = AgentProfile::detect(self.sources.labels()) {
            if agent != self.agent {
                info!(agent = agent.display_name(), "assistant profile changed");
            }
            self.agent = agent;
        }
    }
}

impl<S, C, I> std::fmt::Debug for ClientContext<S, C, I>
where
    S: KeyValueStore,
    C: EventChannel,
    I: IndexingClient,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("session", &self.session)
            .field("tracker", &self.tracker)
            .field("sources", &self.sources.len())
            .field("agent", &self.agent)
            .field("undelivered_reply", &self.undelivered_reply.is_some())
            .finish()
    }
}
