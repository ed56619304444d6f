use duet_core::utils::ROOM_CAPACITY;
use duet_core::{ConnectionId, RoomCode};

/// Result of admitting a connection into a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Added; the room is still waiting for its second participant.
    Waiting,
    /// Added as the second participant. `first` must receive `ready`.
    Paired { first: ConnectionId },
    /// Added, but the room was paired before, so nobody is signalled.
    Rejoined,
    /// The connection is already a member of this room.
    AlreadyMember,
    /// The room holds its maximum number of participants.
    Full,
}

/// Members of one room, kept in join order.
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    members: Vec<ConnectionId>,
    paired: bool,
}

impl Room {
    pub fn new(code: RoomCode) -> Self {
        Self {
            code,
            members: Vec::with_capacity(ROOM_CAPACITY),
            paired: false,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn admit(&mut self, connection_id: ConnectionId) -> JoinOutcome {
        if self.members.contains(&connection_id) {
            return JoinOutcome::AlreadyMember;
        }
        if self.members.len() >= ROOM_CAPACITY {
            return JoinOutcome::Full;
        }

        self.members.push(connection_id);

        if self.members.len() < 2 {
            return JoinOutcome::Waiting;
        }
        if self.paired {
            return JoinOutcome::Rejoined;
        }

        self.paired = true;
        JoinOutcome::Paired {
            first: self.members[0].clone(),
        }
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != connection_id);
        before != self.members.len()
    }

    pub fn members(&self) -> &[ConnectionId] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
