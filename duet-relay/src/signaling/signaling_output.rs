use async_trait::async_trait;
use duet_core::{ConnectionId, RelayMessage};

/// Implemented by whatever owns the client transports (the WebSocket service
/// in production), so the relay can push messages to a single connection.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Fire-and-forget delivery. A message that cannot be delivered is lost.
    async fn deliver(&self, connection_id: ConnectionId, msg: RelayMessage);
}
