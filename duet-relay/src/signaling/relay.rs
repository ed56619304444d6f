use crate::room::{JoinOutcome, RoomRegistry};
use crate::signaling::SignalingOutput;
use duet_core::{ClientMessage, ConnectionId, RelayMessage, RoomCode};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Room-scoped forwarding of negotiation messages.
///
/// Holds no per-message state: every message is either turned into a registry
/// update (`join-room`) or copied to the other members of its room.
#[derive(Clone)]
pub struct SignalingRelay {
    registry: RoomRegistry,
    output: Arc<dyn SignalingOutput>,
}

impl SignalingRelay {
    pub fn new(registry: RoomRegistry, output: Arc<dyn SignalingOutput>) -> Self {
        Self { registry, output }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub async fn handle(&self, from: &ConnectionId, msg: ClientMessage) {
        match msg {
            ClientMessage::JoinRoom(code) => self.join(from, code).await,
            other => {
                let event = other.event_name();
                if let Some((room, relayed)) = other.into_relayed() {
                    debug!("Relaying {} from {} in room {}", event, from.short(), room);
                    self.relay(from, &room, relayed).await;
                }
            }
        }
    }

    pub async fn join(&self, from: &ConnectionId, code: RoomCode) {
        let outcome = self.registry.join(from, &code);
        info!("{} joined room {}: {:?}", from.short(), code, outcome);

        match outcome {
            JoinOutcome::Paired { first } => {
                self.output.deliver(first, RelayMessage::Ready).await;
            }
            JoinOutcome::Full => {
                warn!("Room {} is full, rejecting {}", code, from.short());
                self.output
                    .deliver(from.clone(), RelayMessage::RoomFull(code))
                    .await;
            }
            JoinOutcome::Waiting | JoinOutcome::Rejoined | JoinOutcome::AlreadyMember => {}
        }
    }

    /// Sends `msg` to every member of `room` except `from`. Only members of
    /// `room` may send into it.
    pub async fn relay(&self, from: &ConnectionId, room: &RoomCode, msg: RelayMessage) {
        if self.registry.room_of(from).as_ref() != Some(room) {
            warn!(
                "Dropping {} from {}: not a member of room {}",
                msg.event_name(),
                from.short(),
                room
            );
            return;
        }

        let recipients: Vec<ConnectionId> = self
            .registry
            .members(room)
            .into_iter()
            .filter(|member| member != from)
            .collect();

        if recipients.is_empty() {
            debug!(
                "No recipients for {} in room {}, dropping",
                msg.event_name(),
                room
            );
            return;
        }

        for recipient in recipients {
            self.output.deliver(recipient, msg.clone()).await;
        }
    }

    /// Called once the connection's transport is gone.
    pub async fn disconnect(&self, connection_id: &ConnectionId) {
        if let Some(code) = self.registry.leave(connection_id) {
            info!("{} left room {}", connection_id.short(), code);
        }
    }
}
