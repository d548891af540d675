//! WebSocket event channel.
//!
//! Each frame is a JSON text envelope `{"topic": "...", "payload": "..."}`.
//! One connection task owns the socket and uses `tokio::select!` to
//! multiplex three sources:
//!
//! - **Outbound:** frames queued by [`WsChannel::emit`] are written in order.
//! - **Inbound:** text frames are decoded and delivered to the subscriber
//!   registry. Malformed frames and unknown topics are logged and ignored.
//! - **Shutdown:** cancelling the token sends a close frame and exits.
//!
//! When the socket goes away, for whatever reason, every subscription ends,
//! later subscriptions start out ended, and further emits fail with
//! [`ChannelError::Closed`]. Reconnection is left
//! to the embedder.

use futures_util::{SinkExt, StreamExt};
use ragdesk_core::channel::{EventChannel, SubscriberRegistry, Subscription};
use ragdesk_types::channel::{ChannelEnvelope, Topic};
use ragdesk_types::error::ChannelError;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct WsChannel {
    registry: SubscriberRegistry,
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl WsChannel {
    /// Connect to `url` and spawn the connection task.
    pub async fn connect(url: &str) -> Result<Self, ChannelError> {
        let (socket, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let registry = SubscriberRegistry::new();
        let cancel = CancellationToken::new();

        tokio::spawn(run_connection(
            socket,
            outbound_rx,
            registry.clone(),
            cancel.clone(),
        ));

        tracing::info!(url, "connected to event channel");
        Ok(Self {
            registry,
            outbound,
            cancel,
        })
    }

    /// Close the socket. Subscriptions end once the task has exited.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the connection has ended.
    pub async fn closed(&self) {
        self.cancel.cancelled().await;
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }
}

impl EventChannel for WsChannel {
    fn subscribe(&self, topic: Topic) -> Subscription {
        self.registry.subscribe(topic)
    }

    fn emit(&self, topic: Topic, payload: &str) -> Result<(), ChannelError> {
        if self.cancel.is_cancelled() {
            return Err(ChannelError::Closed);
        }
        let frame = serde_json::to_string(&ChannelEnvelope::new(topic, payload))
            .map_err(|e| ChannelError::Encode(e.to_string()))?;
        self.outbound.send(frame).map_err(|_| ChannelError::Closed)
    }
}

impl Drop for WsChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for WsChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsChannel")
            .field("registry", &self.registry)
            .field("closed", &self.cancel.is_cancelled())
            .finish()
    }
}

async fn run_connection(
    socket: Socket,
    mut outbound: mpsc::UnboundedReceiver<String>,
    registry: SubscriberRegistry,
    cancel: CancellationToken,
) {
    let (mut sink, mut source) = socket.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                if let Err(e) = sink.send(Message::Close(None)).await {
                    tracing::debug!("close frame not sent: {e}");
                }
                break;
            }

            // --- Outbound: queued envelopes to the socket ---
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    break;
                };
                if let Err(e) = sink.send(Message::Text(frame)).await {
                    tracing::warn!("failed to write event frame: {e}");
                    break;
                }
            }

            // --- Inbound: socket frames to subscribers ---
            message = source.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => dispatch_frame(&registry, &text),
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!(?frame, "event channel closed by peer");
                        break;
                    }
                    // Pings are answered by tungstenite; binary frames are not part of the protocol.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("event channel read error: {e}");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    registry.close_all();
    cancel.cancel();
    tracing::info!("event channel disconnected");
}

fn dispatch_frame(registry: &SubscriberRegistry, text: &str) {
    match serde_json::from_str::<ChannelEnvelope>(text) {
        Ok(envelope) => {
            let reached = registry.deliver(envelope.topic, &envelope.payload);
            tracing::trace!(topic = %envelope.topic, reached, "delivered inbound event");
        }
        Err(e) => {
            tracing::warn!("ignoring malformed event frame: {e}");
        }
    }
}
