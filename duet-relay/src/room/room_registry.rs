use crate::room::{JoinOutcome, Room};
use dashmap::DashMap;
use duet_core::{ConnectionId, RoomCode};
use std::sync::Arc;
use tracing::{debug, info};

/// Which connections sit in which room.
///
/// A room's member list is only touched while its shard lock is held, so two
/// concurrent joins can never both observe the "second participant" transition.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomCode, Room>>,
    memberships: Arc<DashMap<ConnectionId, RoomCode>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, connection_id: &ConnectionId, code: &RoomCode) -> JoinOutcome {
        let current = self.memberships.get(connection_id).map(|r| r.value().clone());
        match current {
            Some(current) if &current == code => return JoinOutcome::AlreadyMember,
            Some(current) => {
                debug!(
                    "Connection {} moves from room {} to {}",
                    connection_id.short(),
                    current,
                    code
                );
                self.leave(connection_id);
            }
            None => {}
        }

        let outcome = {
            let mut room = self.rooms.entry(code.clone()).or_insert_with(|| {
                info!("Creating new room: {}", code);
                Room::new(code.clone())
            });
            room.admit(connection_id.clone())
        };

        if !matches!(outcome, JoinOutcome::Full | JoinOutcome::AlreadyMember) {
            self.memberships.insert(connection_id.clone(), code.clone());
        }

        outcome
    }

    /// Drops the connection from its room, if any, and forgets rooms that end up empty.
    pub fn leave(&self, connection_id: &ConnectionId) -> Option<RoomCode> {
        let (_, code) = self.memberships.remove(connection_id)?;

        if let Some(mut room) = self.rooms.get_mut(&code) {
            room.remove(connection_id);
        }

        if self.rooms.remove_if(&code, |_, room| room.is_empty()).is_some() {
            debug!("Room {} is empty, dropping it", code);
        }

        Some(code)
    }

    pub fn members(&self, code: &RoomCode) -> Vec<ConnectionId> {
        self.rooms
            .get(code)
            .map(|room| room.members().to_vec())
            .unwrap_or_default()
    }

    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<RoomCode> {
        self.memberships.get(connection_id).map(|r| r.value().clone())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
