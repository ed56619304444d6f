use crate::error::SessionError;
use crate::media::LocalTrack;
use crate::session::{SessionCommand, SessionSnapshot, SessionState};
use duet_core::RoomCode;
use tokio::sync::{mpsc, oneshot, watch};

/// Cloneable front end of a running [`PeerSession`](crate::PeerSession).
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<SessionCommand>,
        snapshot: watch::Receiver<SessionSnapshot>,
    ) -> Self {
        Self { commands, snapshot }
    }

    /// Acquires local media and asks the relay to join `room`.
    pub async fn join(&self, room: impl Into<RoomCode>) -> Result<(), SessionError> {
        let room = room.into();
        self.request(|reply| SessionCommand::Join { room, reply })
            .await
    }

    /// Returns whether the microphone is enabled afterwards.
    pub async fn toggle_mic(&self) -> Result<bool, SessionError> {
        self.request(|reply| SessionCommand::ToggleMic { reply })
            .await
    }

    /// Returns whether the camera is enabled afterwards.
    pub async fn toggle_camera(&self) -> Result<bool, SessionError> {
        self.request(|reply| SessionCommand::ToggleCamera { reply })
            .await
    }

    pub async fn refresh_camera(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::RefreshCamera { reply })
            .await
    }

    pub async fn attach_track(&self, track: LocalTrack) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::AttachTrack { track, reply })
            .await
    }

    /// Ends the call. Calling it on a session that is already gone is fine.
    pub async fn end_call(&self) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        if self
            .commands
            .send(SessionCommand::EndCall { reply })
            .await
            .is_err()
        {
            return Ok(());
        }
        let _ = rx.await;
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.snapshot.borrow().state
    }

    /// Waits until the session publishes a snapshot matching `f`.
    pub async fn wait_for<F>(&self, f: F) -> Result<SessionSnapshot, SessionError>
    where
        F: FnMut(&SessionSnapshot) -> bool,
    {
        let mut rx = self.snapshot.clone();
        let snapshot = rx.wait_for(f).await.map_err(|_| SessionError::Ended)?;
        Ok(snapshot.clone())
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T, SessionError>>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| SessionError::Ended)?;
        rx.await.map_err(|_| SessionError::Ended)?
    }
}
