//! Session coordination layer for ragdesk.
//!
//! This crate owns the client-side state machines and the trait "ports"
//! their boundaries plug into. It depends only on `ragdesk-types` -- never on
//! `ragdesk-infra` or any network/filesystem crate.

pub mod channel;
pub mod chat;
pub mod context;
pub mod ingest;
pub mod upload;
