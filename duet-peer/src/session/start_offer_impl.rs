use crate::error::{NegotiationError, NegotiationStep};
use crate::session::{Link, PeerSession, Role, SessionState};
use duet_core::{ClientMessage, SdpKind, SessionDescription};
use serde_json::Value;
use tracing::{debug, info, warn};

impl PeerSession {
    /// Makes an offer if the track set changed since the last one and none is
    /// in flight.
    pub(super) async fn maybe_offer(&mut self) {
        if self.role != Some(Role::Initiator) || !self.state.is_active() {
            return;
        }
        if !self.tracker.should_offer() {
            debug!("Negotiation already covered or in flight");
            return;
        }

        if let Err(e) = self.send_offer().await {
            self.fail_negotiation(e).await;
        }
    }

    async fn send_offer(&mut self) -> Result<(), NegotiationError> {
        let connection = self.connection.clone().ok_or_else(|| {
            NegotiationError::step(NegotiationStep::CreateOffer, "no connection")
        })?;

        self.tracker.begin_offer();
        if self.state == SessionState::Connected(Link::Live) {
            self.arm_deadline();
        }

        let offer = connection
            .create_offer()
            .await
            .map_err(|e| NegotiationError::from_anyhow(NegotiationStep::CreateOffer, &e))?;
        connection
            .set_local_description(offer.clone())
            .await
            .map_err(|e| NegotiationError::from_anyhow(NegotiationStep::SetLocalDescription, &e))?;

        let room = self.current_room()?;
        let msg = ClientMessage::offer(room, &offer)
            .map_err(|e| NegotiationError::step(NegotiationStep::SendSignal, e))?;
        self.send_signal(msg)
            .await
            .map_err(|e| NegotiationError::step(NegotiationStep::SendSignal, e))?;

        info!("Offer sent");
        Ok(())
    }

    pub(super) async fn on_remote_answer(&mut self, data: Value) {
        if self.role != Some(Role::Initiator)
            || !self.tracker.in_flight()
            || !self.state.is_active()
        {
            warn!(
                "Ignoring unexpected answer (role {:?}, state {:?})",
                self.role, self.state
            );
            return;
        }

        if let Err(e) = self.apply_answer(data).await {
            self.fail_negotiation(e).await;
            return;
        }

        // A track change that arrived mid-cycle is offered now.
        self.maybe_offer().await;
    }

    async fn apply_answer(&mut self, data: Value) -> Result<(), NegotiationError> {
        let answer: SessionDescription = serde_json::from_value(data)
            .map_err(|e| NegotiationError::step(NegotiationStep::ParseDescription, e))?;
        if answer.kind != SdpKind::Answer {
            return Err(NegotiationError::step(
                NegotiationStep::ParseDescription,
                format!("expected an answer, got {:?}", answer.kind),
            ));
        }

        let connection = self.connection.clone().ok_or_else(|| {
            NegotiationError::step(NegotiationStep::SetRemoteDescription, "no connection")
        })?;

        connection
            .set_remote_description(answer)
            .await
            .map_err(|e| NegotiationError::from_anyhow(NegotiationStep::SetRemoteDescription, &e))?;
        self.remote_description_set = true;
        self.tracker.answer_applied();
        info!("Answer applied");

        self.flush_candidates().await?;

        match self.state {
            SessionState::Negotiating => self.set_state(SessionState::Connected(Link::Pending)),
            SessionState::Connected(Link::Live) => self.clear_deadline(),
            _ => {}
        }
        Ok(())
    }
}
