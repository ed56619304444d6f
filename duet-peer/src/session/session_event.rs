use crate::error::{MediaAcquisitionError, NegotiationError};
use crate::session::SessionState;
use crate::transport::RemoteTrack;
use duet_core::RoomCode;

/// What the application hears from a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged(SessionState),
    MediaAcquisitionFailed(MediaAcquisitionError),
    NegotiationFailed(NegotiationError),
    PeerDisconnected,
    RoomFull(RoomCode),
    RemoteTrack(RemoteTrack),
    CallEnded,
}
