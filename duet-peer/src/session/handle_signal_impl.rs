use crate::error::{NegotiationError, NegotiationStep};
use crate::session::{PeerSession, Role, SessionEvent, SessionState};
use duet_core::{CandidateInit, RelayMessage, Relayed, RoomCode};
use serde_json::Value;
use tracing::{debug, info, warn};

impl PeerSession {
    pub(super) async fn handle_signal(&mut self, msg: RelayMessage) {
        debug!("Relay message {} while {:?}", msg.event_name(), self.state);

        match msg {
            RelayMessage::Ready => self.on_ready().await,
            RelayMessage::RoomFull(code) => self.on_room_full(code).await,
            RelayMessage::Offer(Relayed { data })
            | RelayMessage::Answer(Relayed { data })
            | RelayMessage::Candidate(Relayed { data })
                if data.is_null() =>
            {
                debug!("Ignoring message with null payload");
            }
            RelayMessage::Offer(Relayed { data }) => self.on_remote_offer(data).await,
            RelayMessage::Answer(Relayed { data }) => self.on_remote_answer(data).await,
            RelayMessage::Candidate(Relayed { data }) => self.on_remote_candidate(data).await,
        }
    }

    async fn on_ready(&mut self) {
        if self.state != SessionState::WaitingForPeer {
            warn!("Ignoring ready while {:?}", self.state);
            return;
        }

        info!("Peer joined, negotiating as initiator");
        self.role = Some(Role::Initiator);

        if let Err(e) = self.create_connection().await {
            self.fail_negotiation(e).await;
            return;
        }

        self.set_state(SessionState::Negotiating);
        self.arm_deadline();
    }

    async fn on_room_full(&mut self, code: RoomCode) {
        if self.state != SessionState::WaitingForPeer {
            warn!("Ignoring room-full for {} while {:?}", code, self.state);
            return;
        }

        warn!("Room {} is full", code);
        self.emit(SessionEvent::RoomFull(code));
        self.release().await;
        self.finished = true;
    }

    async fn on_remote_candidate(&mut self, data: Value) {
        if !self.state.is_active() {
            warn!("Ignoring candidate while {:?}", self.state);
            return;
        }

        let candidate: CandidateInit = match serde_json::from_value(data) {
            Ok(c) => c,
            Err(e) => {
                self.fail_negotiation(NegotiationError::step(NegotiationStep::ParseCandidate, e))
                    .await;
                return;
            }
        };

        let connection = match (&self.connection, self.remote_description_set) {
            (Some(connection), true) => connection.clone(),
            _ => {
                debug!("No remote description yet, buffering candidate");
                self.candidates.push(candidate);
                return;
            }
        };

        if let Err(e) = connection.add_ice_candidate(candidate).await {
            self.fail_negotiation(NegotiationError::from_anyhow(
                NegotiationStep::AddCandidate,
                &e,
            ))
            .await;
        }
    }

    /// Applies every buffered candidate once, in arrival order.
    pub(super) async fn flush_candidates(&mut self) -> Result<(), NegotiationError> {
        let Some(connection) = self.connection.clone() else {
            return Ok(());
        };

        let pending = self.candidates.drain();
        if !pending.is_empty() {
            debug!("Applying {} buffered candidates", pending.len());
        }

        for candidate in pending {
            connection
                .add_ice_candidate(candidate)
                .await
                .map_err(|e| NegotiationError::from_anyhow(NegotiationStep::AddCandidate, &e))?;
        }
        Ok(())
    }

    pub(super) fn current_room(&self) -> Result<RoomCode, NegotiationError> {
        self.room
            .clone()
            .ok_or_else(|| NegotiationError::step(NegotiationStep::SendSignal, "no room joined"))
    }
}
