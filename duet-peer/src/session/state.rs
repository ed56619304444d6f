/// Connectivity of an established negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Pending,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    WaitingForPeer,
    Negotiating,
    Connected(Link),
    Closed,
}

impl SessionState {
    /// Still taking part in a call.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Idle | Self::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Received `ready`; produces offers.
    Initiator,
    /// Joined second; only answers.
    Responder,
}

/// Read-only view of a session, republished after every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub role: Option<Role>,
    pub remote_description_set: bool,
    pub buffered_candidates: usize,
    pub local_tracks: usize,
    pub peer_connected: bool,
    pub mic_enabled: bool,
    pub camera_enabled: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            role: None,
            remote_description_set: false,
            buffered_candidates: 0,
            local_tracks: 0,
            peer_connected: false,
            mic_enabled: false,
            camera_enabled: false,
        }
    }
}

/// Serializes offers on the initiating side.
///
/// Every change to the local track set bumps a generation. An offer covers the
/// generation current when it was made, so a negotiation-needed signal for an
/// already offered generation is a duplicate, and one arriving while an offer
/// is in flight waits for the answer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NegotiationTracker {
    track_generation: u64,
    offered_generation: u64,
    in_flight: bool,
}

impl NegotiationTracker {
    pub fn tracks_changed(&mut self) {
        self.track_generation += 1;
    }

    pub fn should_offer(&self) -> bool {
        !self.in_flight && self.offered_generation < self.track_generation
    }

    pub fn begin_offer(&mut self) {
        self.in_flight = true;
        self.offered_generation = self.track_generation;
    }

    pub fn answer_applied(&mut self) {
        self.in_flight = false;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
