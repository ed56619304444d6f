use crate::error::{NegotiationError, NegotiationStep, SessionError};
use crate::media::{FacingMode, LocalTrack, MediaConstraints, TrackKind};
use crate::session::{PeerSession, Role, SessionEvent, SessionState};
use crate::transport::LinkState;
use duet_core::{ClientMessage, RoomCode};
use tracing::{error, info, warn};

impl PeerSession {
    pub(super) async fn join(&mut self, room: RoomCode) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::InvalidState {
                state: self.state,
                action: "join",
            });
        }

        info!("Joining room {}", room);

        let media = match self.media_source.acquire(&self.config.media).await {
            Ok(media) => media,
            Err(e) => {
                error!("Failed to acquire local media: {}", e);
                self.emit(SessionEvent::MediaAcquisitionFailed(e.clone()));
                self.set_state(SessionState::Closed);
                self.finished = true;
                return Err(e.into());
            }
        };

        self.local_sink.attach(media.stream());
        self.local_media = Some(media);
        self.room = Some(room.clone());

        if let Err(e) = self.send_signal(ClientMessage::JoinRoom(room)).await {
            error!("Failed to send join: {}", e);
            self.release().await;
            self.finished = true;
            return Err(e.into());
        }

        self.set_state(SessionState::WaitingForPeer);
        Ok(())
    }

    /// Flips the enabled flag of every local track of `kind`. Senders are left
    /// alone, so this never renegotiates.
    pub(super) fn toggle(&self, kind: TrackKind) -> Result<bool, SessionError> {
        let enabled = self
            .local_media
            .as_ref()
            .and_then(|media| media.toggle(kind))
            .ok_or(SessionError::NoTrack(kind))?;

        info!(
            "Local {} {}",
            kind,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(enabled)
    }

    /// Swaps the camera track for a freshly acquired one on the same sender.
    pub(super) async fn refresh_camera(&mut self) -> Result<(), SessionError> {
        let Some(old) = self
            .local_media
            .as_ref()
            .and_then(|media| media.first_of_kind(TrackKind::Video))
            .cloned()
        else {
            return Err(SessionError::NoTrack(TrackKind::Video));
        };

        let facing = self.config.media.video.unwrap_or(FacingMode::User);
        let fresh = self
            .media_source
            .acquire(&MediaConstraints::video_only(facing))
            .await?;

        let Some(track) = fresh.first_of_kind(TrackKind::Video).cloned() else {
            return Err(SessionError::NoTrack(TrackKind::Video));
        };
        for extra in fresh.tracks().iter().filter(|t| t.id() != track.id()) {
            extra.stop();
        }

        if let Some(sender) = self.senders.iter_mut().find(|id| id.as_str() == old.id()) {
            if let Some(connection) = self.connection.clone() {
                if let Err(e) = connection.replace_track(old.id(), &track).await {
                    track.stop();
                    return Err(SessionError::TrackReplacement(format!("{:#}", e)));
                }
            }
            *sender = track.id().to_owned();
        }

        old.stop();
        if let Some(media) = self.local_media.as_mut() {
            media.replace(old.id(), track.clone());
            self.local_sink.attach(media.stream());
        }

        info!("Camera track {} replaced by {}", old.id(), track.id());
        Ok(())
    }

    /// Adds a track to the local set. On the initiator the connection then
    /// asks for a new offer.
    pub(super) async fn attach_track(&mut self, track: LocalTrack) -> Result<(), SessionError> {
        if !self.state.is_active() {
            return Err(SessionError::InvalidState {
                state: self.state,
                action: "attach a track",
            });
        }

        if let Some(connection) = self.connection.clone() {
            connection.add_track(&track).await.map_err(|e| {
                SessionError::Negotiation(NegotiationError::from_anyhow(
                    NegotiationStep::AttachTracks,
                    &e,
                ))
            })?;
            self.senders.push(track.id().to_owned());
            self.tracker.tracks_changed();

            if self.role == Some(Role::Responder) {
                warn!(
                    "Renegotiation from the responder is not supported; {} is not offered",
                    track.id()
                );
            }
        }

        info!("Attached local {} track {}", track.kind(), track.id());
        if let Some(media) = self.local_media.as_mut() {
            media.push(track);
            self.local_sink.attach(media.stream());
        }
        Ok(())
    }

    pub(super) async fn end_call(&mut self) {
        if self.finished {
            return;
        }

        info!("Ending call");
        self.release().await;

        if !self.config.hangup_delay.is_zero() {
            tokio::time::sleep(self.config.hangup_delay).await;
        }

        self.emit(SessionEvent::CallEnded);
        self.finished = true;
    }

    /// Tears everything down to `Closed`. Runs at most once.
    pub(super) async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Some(connection) = self.connection.take() {
            for track_id in self.senders.drain(..) {
                if let Err(e) = connection.remove_track(&track_id).await {
                    warn!("Failed to remove sender for {}: {:#}", track_id, e);
                }
            }
            if let Err(e) = connection.close().await {
                warn!("Failed to close media connection: {:#}", e);
            }
        }
        self.senders.clear();

        if let Some(mut media) = self.local_media.take() {
            media.stop_all();
        }

        self.candidates.clear();
        self.remote_description_set = false;
        self.remote_tracks.clear();
        self.tracker.reset();
        self.clear_deadline();
        self.peer_connected = false;

        self.local_sink.detach();
        self.remote_sink.detach();

        self.set_state(SessionState::Closed);
    }

    pub(super) fn on_peer_disconnected(&mut self, link: LinkState) {
        if self.state == SessionState::Closed {
            return;
        }

        warn!("Peer connection lost ({:?})", link);
        self.remote_sink.detach();
        self.remote_tracks.clear();
        self.peer_connected = false;
        self.clear_deadline();

        self.set_state(SessionState::Closed);
        self.emit(SessionEvent::PeerDisconnected);
    }

    pub(super) async fn fail_negotiation(&mut self, err: NegotiationError) {
        error!("Negotiation failed: {}", err);
        self.emit(SessionEvent::NegotiationFailed(err));
        self.release().await;
        self.finished = true;
    }

    pub(super) async fn negotiation_timed_out(&mut self) {
        self.clear_deadline();
        let timeout = self.config.negotiation_timeout;
        self.fail_negotiation(NegotiationError::Timeout(timeout))
            .await;
    }
}
