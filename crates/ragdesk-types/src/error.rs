use thiserror::Error;

/// Errors from profile storage (used by the key-value store trait in ragdesk-core).
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid storage key: '{0}'")]
    InvalidKey(String),
}

/// Errors from the real-time event channel.
#[derive(Debug, Clone, Error)]
pub enum ChannelError {
    #[error("channel closed")]
    Closed,

    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("failed to encode event: {0}")]
    Encode(String),
}

/// Errors from the indexing service boundary.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    #[error("{0}")]
    Transport(String),

    /// Non-success HTTP status. `message` is the body's `error` field, or
    /// the status line when the body has none.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("invalid indexing response: {0}")]
    InvalidResponse(String),

    #[error("failed to build indexing client: {0}")]
    Client(String),
}
