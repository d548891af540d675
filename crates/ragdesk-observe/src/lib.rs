//! Observability setup for ragdesk front ends.
//!
//! The library crates only emit `tracing` events; whoever embeds them calls
//! [`tracing_setup::init_tracing`] once at startup.

pub mod tracing_setup;
