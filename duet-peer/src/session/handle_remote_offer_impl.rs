use crate::error::{NegotiationError, NegotiationStep};
use crate::session::{Link, PeerSession, Role, SessionState};
use duet_core::{ClientMessage, SdpKind, SessionDescription};
use serde_json::Value;
use tracing::{info, warn};

impl PeerSession {
    pub(super) async fn on_remote_offer(&mut self, data: Value) {
        match (self.state, self.role) {
            (SessionState::WaitingForPeer, _) => {}
            (SessionState::Negotiating | SessionState::Connected(_), Some(Role::Responder)) => {
                info!("Peer is renegotiating");
            }
            (_, Some(Role::Initiator)) => {
                warn!("Ignoring offer: this side is the initiator");
                return;
            }
            (state, _) => {
                warn!("Ignoring offer while {:?}", state);
                return;
            }
        }

        if let Err(e) = self.answer_offer(data).await {
            self.fail_negotiation(e).await;
        }
    }

    async fn answer_offer(&mut self, data: Value) -> Result<(), NegotiationError> {
        let offer: SessionDescription = serde_json::from_value(data)
            .map_err(|e| NegotiationError::step(NegotiationStep::ParseDescription, e))?;
        if offer.kind != SdpKind::Offer {
            return Err(NegotiationError::step(
                NegotiationStep::ParseDescription,
                format!("expected an offer, got {:?}", offer.kind),
            ));
        }

        if self.connection.is_none() {
            info!("Received offer, answering as responder");
            self.role = Some(Role::Responder);
            self.set_state(SessionState::Negotiating);
            self.create_connection().await?;
            self.arm_deadline();
        }

        let connection = self.connection.clone().ok_or_else(|| {
            NegotiationError::step(NegotiationStep::CreateConnection, "no connection")
        })?;

        connection
            .set_remote_description(offer)
            .await
            .map_err(|e| NegotiationError::from_anyhow(NegotiationStep::SetRemoteDescription, &e))?;
        self.remote_description_set = true;

        let answer = connection
            .create_answer()
            .await
            .map_err(|e| NegotiationError::from_anyhow(NegotiationStep::CreateAnswer, &e))?;
        connection
            .set_local_description(answer.clone())
            .await
            .map_err(|e| NegotiationError::from_anyhow(NegotiationStep::SetLocalDescription, &e))?;

        let room = self.current_room()?;
        let msg = ClientMessage::answer(room, &answer)
            .map_err(|e| NegotiationError::step(NegotiationStep::SendSignal, e))?;
        self.send_signal(msg)
            .await
            .map_err(|e| NegotiationError::step(NegotiationStep::SendSignal, e))?;
        info!("Answer sent");

        self.flush_candidates().await?;

        match self.state {
            SessionState::Connected(Link::Live) => self.clear_deadline(),
            SessionState::Connected(Link::Pending) => {}
            _ => self.set_state(SessionState::Connected(Link::Pending)),
        }
        Ok(())
    }
}
