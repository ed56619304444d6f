use crate::error::{NegotiationError, NegotiationStep};
use crate::session::PeerSession;
use tracing::{debug, info};

impl PeerSession {
    /// Creates the underlying connection if there is none and puts every local
    /// track on it.
    pub(super) async fn create_connection(&mut self) -> Result<(), NegotiationError> {
        if self.connection.is_some() {
            return Ok(());
        }

        let connection = self
            .connections
            .create(self.conn_events_tx.clone())
            .await
            .map_err(|e| NegotiationError::from_anyhow(NegotiationStep::CreateConnection, &e))?;
        info!("Media connection created");
        self.connection = Some(connection.clone());

        let tracks = self
            .local_media
            .as_ref()
            .map(|m| m.tracks().to_vec())
            .unwrap_or_default();

        for track in &tracks {
            connection
                .add_track(track)
                .await
                .map_err(|e| NegotiationError::from_anyhow(NegotiationStep::AttachTracks, &e))?;
            debug!("Attached local {} track {}", track.kind(), track.id());
            self.senders.push(track.id().to_owned());
        }

        if !tracks.is_empty() {
            self.tracker.tracks_changed();
        }
        Ok(())
    }
}
