//! Client configuration types for ragdesk.
//!
//! `ClientConfig` represents the `config.toml` in the data directory that
//! points the client at its backend and fixes the per-deployment chat limit.

use serde::{Deserialize, Serialize};

/// Top-level client configuration.
///
/// Loaded from `~/.ragdesk/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the indexing service (`/indexData` is appended).
    #[serde(default = "default_indexing_url")]
    pub indexing_url: String,

    /// WebSocket URL of the real-time channel.
    #[serde(default = "default_channel_url")]
    pub channel_url: String,

    /// Maximum user messages per session.
    #[serde(default = "default_chat_limit")]
    pub chat_limit: u32,

    /// How long the completed loader lingers after the terminal stage.
    #[serde(default = "default_completion_grace_ms")]
    pub completion_grace_ms: u64,

    /// Fail an ingestion job after this many seconds without a stage
    /// notification. Unset means wait indefinitely.
    #[serde(default)]
    pub stage_idle_timeout_secs: Option<u64>,

    /// Timeout for a single indexing request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_indexing_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_channel_url() -> String {
    "ws://localhost:3000/ws".to_string()
}

fn default_chat_limit() -> u32 {
    3
}

fn default_completion_grace_ms() -> u64 {
    2_000
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            indexing_url: default_indexing_url(),
            channel_url: default_channel_url(),
            chat_limit: default_chat_limit(),
            completion_grace_ms: default_completion_grace_ms(),
            stage_idle_timeout_secs: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
