use crate::media::SinkStream;
use crate::session::{Link, PeerSession, Role, SessionEvent, SessionState};
use crate::transport::{ConnectionEvent, LinkState, RemoteTrack};
use duet_core::{CandidateInit, ClientMessage};
use tracing::{debug, info, warn};

impl PeerSession {
    pub(super) async fn handle_connection_event(&mut self, event: ConnectionEvent) {
        if !self.state.is_active() {
            debug!("Dropping {:?} while {:?}", event, self.state);
            return;
        }

        match event {
            ConnectionEvent::NegotiationNeeded => match self.role {
                Some(Role::Initiator) => self.maybe_offer().await,
                Some(Role::Responder) => {
                    info!("Responder cannot renegotiate; local track changes stay unoffered")
                }
                None => debug!("Negotiation needed before a role was assigned"),
            },
            ConnectionEvent::LocalCandidate(candidate) => {
                self.send_local_candidate(candidate).await
            }
            ConnectionEvent::LinkStateChanged(link) => self.on_link_state(link).await,
            ConnectionEvent::RemoteTrack(track) => self.on_remote_track(track),
        }
    }

    async fn send_local_candidate(&mut self, candidate: CandidateInit) {
        let Some(room) = self.room.clone() else {
            return;
        };

        let msg = match ClientMessage::candidate(room, &candidate) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Failed to encode local candidate: {}", e);
                return;
            }
        };

        if let Err(e) = self.send_signal(msg).await {
            warn!("Failed to send local candidate: {}", e);
        }
    }

    async fn on_link_state(&mut self, link: LinkState) {
        match link {
            LinkState::Connected => {
                self.peer_connected = true;
                if matches!(
                    self.state,
                    SessionState::Negotiating | SessionState::Connected(Link::Pending)
                ) {
                    self.set_state(SessionState::Connected(Link::Live));
                    if !self.tracker.in_flight() {
                        self.clear_deadline();
                    }
                }
            }
            link if link.is_lost() => self.on_peer_disconnected(link),
            other => debug!("Link state {:?}", other),
        }
    }

    fn on_remote_track(&mut self, track: RemoteTrack) {
        info!("Remote {} track {} attached", track.kind, track.id);

        let stream_id = track.stream_id.clone();
        self.remote_tracks.push(track.clone());

        let track_ids = self
            .remote_tracks
            .iter()
            .filter(|t| t.stream_id == stream_id)
            .map(|t| t.id.clone())
            .collect();
        self.remote_sink.attach(SinkStream {
            stream_id,
            track_ids,
        });

        self.emit(SessionEvent::RemoteTrack(track));
    }
}
