use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use duet_core::{ConnectionId, RelayMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

struct SignalingInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

/// Outbound side of every open WebSocket, keyed by connection.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                connections: DashMap::new(),
            }),
        }
    }

    pub fn add_connection(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.connections.insert(connection_id, tx);
    }

    pub fn remove_connection(&self, connection_id: &ConnectionId) {
        self.inner.connections.remove(connection_id);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    pub fn send_signal(&self, connection_id: &ConnectionId, msg: &RelayMessage) {
        let Some(connection) = self.inner.connections.get(connection_id) else {
            warn!(
                "Relay delivery lost: {} for closed connection {}",
                msg.event_name(),
                connection_id.short()
            );
            return;
        };

        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = connection.send(Message::Text(json.into())) {
                    warn!(
                        "Relay delivery lost: failed to queue {} for {}: {:?}",
                        msg.event_name(),
                        connection_id.short(),
                        e
                    );
                } else {
                    debug!("Sent {} to {}", msg.event_name(), connection_id.short());
                }
            }
            Err(e) => error!("Failed to serialize relay message: {}", e),
        }
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn deliver(&self, connection_id: ConnectionId, msg: RelayMessage) {
        self.send_signal(&connection_id, &msg);
    }
}
