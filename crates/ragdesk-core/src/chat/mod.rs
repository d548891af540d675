//! Conversation session.
//!
//! - `store` -- [`KeyValueStore`] persistence port and [`InMemoryStore`]
//! - `session` -- [`SessionManager`], the message log with its usage quota

pub mod session;
pub mod store;

pub use session::{CHAT_KEY, MIN_CHAT_LIMIT, SessionManager, USAGE_KEY};
pub use store::{InMemoryStore, KeyValueStore};
