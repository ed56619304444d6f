use crate::media::TrackKind;
use duet_core::CandidateInit;

/// Connectivity of the underlying point-to-point connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl LinkState {
    /// The peer is gone and will not come back on its own.
    pub fn is_lost(self) -> bool {
        matches!(self, Self::Disconnected | Self::Failed | Self::Closed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub id: String,
    pub stream_id: String,
    pub kind: TrackKind,
}

/// Events the connection emits for the session to process.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// The local track set changed and an offer is due.
    NegotiationNeeded,

    /// A local candidate was gathered and must reach the other peer.
    LocalCandidate(CandidateInit),

    LinkStateChanged(LinkState),

    RemoteTrack(RemoteTrack),
}
