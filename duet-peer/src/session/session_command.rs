use crate::error::SessionError;
use crate::media::LocalTrack;
use duet_core::RoomCode;
use tokio::sync::oneshot;

pub type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

/// Local requests sent to the session actor by its handle.
pub enum SessionCommand {
    Join { room: RoomCode, reply: Reply<()> },
    ToggleMic { reply: Reply<bool> },
    ToggleCamera { reply: Reply<bool> },
    RefreshCamera { reply: Reply<()> },
    AttachTrack { track: LocalTrack, reply: Reply<()> },
    EndCall { reply: oneshot::Sender<()> },
}
