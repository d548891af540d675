//! Event channel contract.
//!
//! The real-time transport is reached only through [`EventChannel`]:
//! subscribe to a [`Topic`] and get a scoped [`Subscription`], or emit a raw
//! text payload on a topic. Delivery is ordered per topic, never across
//! topics. Reconnection belongs to the transport, not here.
//!
//! - `registry` -- [`SubscriberRegistry`] fan-out table and [`Subscription`] handles
//! - `local` -- [`LocalChannel`], an in-process loopback adapter

pub mod local;
pub mod registry;

use ragdesk_types::channel::Topic;
use ragdesk_types::error::ChannelError;

pub use local::LocalChannel;
pub use registry::{SubscriberRegistry, Subscription};

/// Bidirectional named-topic push channel.
///
/// Implementations live in this crate (`LocalChannel`) and in ragdesk-infra
/// (`WsChannel`).
pub trait EventChannel: Send + Sync {
    /// Start receiving events published on `topic`.
    fn subscribe(&self, topic: Topic) -> Subscription;

    /// Publish `payload` on `topic`. Never blocks.
    fn emit(&self, topic: Topic, payload: &str) -> Result<(), ChannelError>;
}
