//! In-process loopback channel.
//!
//! Emitted events go to an outbound receiver held by whoever plays the
//! backend; that side injects inbound events with [`LocalChannel::deliver`].

use ragdesk_types::channel::{ChannelEnvelope, Topic};
use ragdesk_types::error::ChannelError;
use tokio::sync::mpsc;
use tracing::debug;

use super::EventChannel;
use super::registry::{SubscriberRegistry, Subscription};

pub struct LocalChannel {
    registry: SubscriberRegistry,
    outbound: mpsc::UnboundedSender<ChannelEnvelope>,
}

impl LocalChannel {
    /// Create a channel and the receiver for everything it emits.
    ///
    /// Dropping the receiver makes further emits fail with
    /// [`ChannelError::Closed`].
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChannelEnvelope>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let channel = Self {
            registry: SubscriberRegistry::new(),
            outbound,
        };
        (channel, rx)
    }

    /// Inject an inbound event as if the transport had received it.
    pub fn deliver(&self, topic: Topic, payload: &str) -> usize {
        self.registry.deliver(topic, payload)
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }
}

impl EventChannel for LocalChannel {
    fn subscribe(&self, topic: Topic) -> Subscription {
        self.registry.subscribe(topic)
    }

    fn emit(&self, topic: Topic, payload: &str) -> Result<(), ChannelError> {
        self.outbound
            .send(ChannelEnvelope::new(topic, payload))
            .map_err(|_| ChannelError::Closed)?;
        debug!(%topic, "emitted event on local channel");
        Ok(())
    }
}

impl std::fmt::Debug for LocalChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalChannel")
            .field("registry", &self.registry)
            .field("outbound_closed", &self.outbound.is_closed())
            .finish()
    }
}
