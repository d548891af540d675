//! Topic-keyed subscriber registry with RAII subscriptions.
//!
//! Every [`Subscription`] owns an unbounded queue fed by
//! [`SubscriberRegistry::deliver`]. Queues are unbounded because push events
//! must not be dropped or block the transport's reader. Closing (or dropping)
//! a subscription removes it from the registry; nothing is delivered to it
//! afterwards. Once [`SubscriberRegistry::close_all`] has run, the registry
//! stays closed and new subscriptions start out ended.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use ragdesk_types::channel::Topic;
use tokio::sync::mpsc;
use tracing::debug;

struct Subscriber {
    id: u64,
    sender: mpsc::UnboundedSender<String>,
}

#[derive(Default)]
struct RegistryInner {
    /// Subscribers per topic, in registration order.
    topics: DashMap<Topic, Vec<Subscriber>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

/// Fan-out table shared by a channel adapter and its subscriptions.
///
/// Cloning shares the same table.
#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    inner: Arc<RegistryInner>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber for `topic`.
    ///
    /// After [`close_all`](Self::close_all) the subscription is returned
    /// unregistered and its `recv` yields `None` straight away.
    pub fn subscribe(&self, topic: Topic) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        // Checked under the shard lock so a concurrent close_all cannot miss us.
        let mut subscribers = self.inner.topics.entry(topic).or_default();
        if self.inner.closed.load(Ordering::Acquire) {
            drop(subscribers);
            self.inner.topics.remove(&topic);
            drop(sender);
            debug!(%topic, subscription_id = id, "registry closed, subscription ended");
        } else {
            subscribers.push(Subscriber { id, sender });
            drop(subscribers);
            debug!(%topic, subscription_id = id, "subscribed to topic");
        }

        Subscription {
            id,
            topic,
            receiver,
            registry: Arc::downgrade(&self.inner),
            closed: false,
        }
    }

    /// Deliver `payload` to every live subscriber of `topic`, in
    /// registration order. Returns the number of subscribers reached.
    pub fn deliver(&self, topic: Topic, payload: &str) -> usize {
        let Some(mut subscribers) = self.inner.topics.get_mut(&topic) else {
            debug!(%topic, "no subscribers for topic, event dropped");
            return 0;
        };
        // A failed send means the receiver is gone; prune it.
        subscribers.retain(|s| s.sender.send(payload.to_string()).is_ok());
        subscribers.len()
    }

    /// Number of live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner.topics.get(&topic).map_or(0, |subs| subs.len())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// End every subscription. Their `recv` yields `None` once drained.
    ///
    /// Permanent: later subscriptions are ended on creation.
    pub fn close_all(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.topics.clear();
        debug!("closed all subscriptions");
    }
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("topics", &self.inner.topics.len())
            .finish()
    }
}

/// Scoped handle to one topic's event stream.
///
/// Released by [`Subscription::close`] or on drop; both are idempotent.
pub struct Subscription {
    id: u64,
    topic: Topic,
    receiver: mpsc::UnboundedReceiver<String>,
    registry: Weak<RegistryInner>,
    closed: bool,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Wait for the next payload. `None` once closed or the channel is gone.
    ///
    /// Cancel-safe: dropping the future never loses a payload.
    pub async fn recv(&mut self) -> Option<String> {
        if self.closed {
            return None;
        }
        self.receiver.recv().await
    }

    /// Take the next payload if one is already queued.
    pub fn try_recv(&mut self) -> Option<String> {
        if self.closed {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    /// Unsubscribe. Queued but unread payloads are discarded.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.receiver.close();

        if let Some(inner) = self.registry.upgrade() {
            if let Some(mut subscribers) = inner.topics.get_mut(&self.topic) {
                subscribers.retain(|s| s.id != self.id);
            }
        }
        debug!(topic = %self.topic, subscription_id = self.id, "unsubscribed from topic");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deliver_reaches_subscriber_in_order() {
        let registry = SubscriberRegistry::new();
        let mut sub = registry.subscribe(Topic::IngestionStage);

        registry.deliver(Topic::IngestionStage, "Processing");
        registry.deliver(Topic::IngestionStage, "Chunking");

        assert_eq!(sub.recv().await.as_deref(), Some("Processing"));
        assert_eq!(sub.recv().await.as_deref(), Some("Chunking"));
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive_event() {
        let registry = SubscriberRegistry::new();
        let mut a = registry.subscribe(Topic::AssistantMessage);
        let mut b = registry.subscribe(Topic::AssistantMessage);

        let reached = registry.deliver(Topic::AssistantMessage, "answer");
        assert_eq!(reached, 2);
        assert_eq!(a.recv().await.as_deref(), Some("answer"));
        assert_eq!(b.recv().await.as_deref(), Some("answer"));
    }

    #[test]
    fn topics_are_isolated() {
        let registry = SubscriberRegistry::new();
        let mut stages = registry.subscribe(Topic::IngestionStage);

        registry.deliver(Topic::AssistantMessage, "hello");
        assert!(stages.try_recv().is_none());
    }

    #[test]
    fn deliver_without_subscribers_returns_zero() {
        let registry = SubscriberRegistry::new();
        assert_eq!(registry.deliver(Topic::IngestionStage, "Storing"), 0);
    }

    #[test]
    fn close_is_idempotent_and_stops_delivery() {
        let registry = SubscriberRegistry::new();
        let mut sub = registry.subscribe(Topic::IngestionStage);
        registry.deliver(Topic::IngestionStage, "Processing");

        sub.close();
        sub.close();

        assert!(sub.is_closed());
        assert_eq!(registry.subscriber_count(Topic::IngestionStage), 0);
        assert_eq!(registry.deliver(Topic::IngestionStage, "Chunking"), 0);
        // Queued payload from before the close is discarded too.
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn drop_unsubscribes() {
        let registry = SubscriberRegistry::new();
        {
            let _sub = registry.subscribe(Topic::AssistantMessage);
            assert_eq!(registry.subscriber_count(Topic::AssistantMessage), 1);
        }
        assert_eq!(registry.subscriber_count(Topic::AssistantMessage), 0);
    }

    #[test]
    fn closing_one_subscription_keeps_others() {
        let registry = SubscriberRegistry::new();
        let mut first = registry.subscribe(Topic::AssistantMessage);
        let mut second = registry.subscribe(Topic::AssistantMessage);

        first.close();
        registry.deliver(Topic::AssistantMessage, "still here");

        assert!(first.try_recv().is_none());
        assert_eq!(second.try_recv().as_deref(), Some("still here"));
    }

    #[tokio::test]
    async fn close_all_ends_receivers() {
        let registry = SubscriberRegistry::new();
        let mut sub = registry.subscribe(Topic::AssistantMessage);
        registry.deliver(Topic::AssistantMessage, "last");

        registry.close_all();

        assert_eq!(sub.recv().await.as_deref(), Some("last"));
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test]
    async fn subscribe_after_close_all_is_already_ended() {
        let registry = SubscriberRegistry::new();
        registry.close_all();
        assert!(registry.is_closed());

        let mut sub = registry.subscribe(Topic::IngestionStage);
        assert_eq!(registry.subscriber_count(Topic::IngestionStage), 0);
        assert_eq!(registry.deliver(Topic::IngestionStage, "Processing"), 0);
        assert_eq!(sub.recv().await, None);
    }

    #[test]
    fn subscription_outliving_registry_closes_cleanly() {
        let registry = SubscriberRegistry::new();
        let mut sub = registry.subscribe(Topic::IngestionStage);
        drop(registry);
        sub.close();
        assert!(sub.is_closed());
    }

    #[test]
    fn debug_impls() {
        let registry = SubscriberRegistry::new();
        let sub = registry.subscribe(Topic::ClientMessage);
        assert!(format!("{registry:?}").contains("SubscriberRegistry"));
        assert!(format!("{sub:?}").contains("ClientMessage"));
    }
}
