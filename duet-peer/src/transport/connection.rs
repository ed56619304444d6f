use crate::media::LocalTrack;
use crate::transport::ConnectionEvent;
use anyhow::Result;
use async_trait::async_trait;
use duet_core::{CandidateInit, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

/// One point-to-point media connection.
///
/// Senders are addressed by the id of the local track they carry.
#[async_trait]
pub trait MediaConnection: Send + Sync {
    async fn add_track(&self, track: &LocalTrack) -> Result<()>;

    /// Puts `track` on the sender currently carrying `old_track_id`.
    async fn replace_track(&self, old_track_id: &str, track: &LocalTrack) -> Result<()>;

    async fn remove_track(&self, track_id: &str) -> Result<()>;

    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, description: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: CandidateInit) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Builds a connection that reports into `events`.
    async fn create(
        &self,
        events: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> Result<Arc<dyn MediaConnection>>;
}
