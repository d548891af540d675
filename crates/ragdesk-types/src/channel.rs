//! Event channel topics and the wire envelope.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Named topic on the real-time channel.
///
/// Wire names are fixed by the backend deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// Outbound user text.
    #[serde(rename = "client")]
    ClientMessage,
    /// Inbound assistant text.
    #[serde(rename = "server")]
    AssistantMessage,
    /// Inbound ingestion stage name.
    #[serde(rename = "processing")]
    IngestionStage,
}

impl Topic {
    pub fn wire_name(self) -> &'static str {
        match self {
            Topic::ClientMessage => "client",
            Topic::AssistantMessage => "server",
            Topic::IngestionStage => "processing",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One event on the channel: a topic and its raw text payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEnvelope {
    pub topic: Topic,
    pub payload: String,
}

impl ChannelEnvelope {
    pub fn new(topic: Topic, payload: impl Into<String>) -> Self {
        Self {
            topic,
            payload: payload.into(),
        }
    }
}
