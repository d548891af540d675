//! Shared domain types for ragdesk.
//!
//! This crate contains the types exchanged between the coordination layer and
//! its boundaries: chat messages, ingestion stages, content sources, channel
//! topics, client configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod channel;
pub mod chat;
pub mod config;
pub mod error;
pub mod ingest;
pub mod source;
