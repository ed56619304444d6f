use crate::error::ChannelError;
use async_trait::async_trait;
use duet_core::{ClientMessage, RelayMessage};

/// The session's link to the relay. Each session owns exactly one.
#[async_trait]
pub trait SignalingChannel: Send {
    async fn send(&mut self, msg: ClientMessage) -> Result<(), ChannelError>;

    /// Next message from the relay, or `None` once the channel is closed.
    /// Must be cancel-safe.
    async fn recv(&mut self) -> Option<RelayMessage>;
}
