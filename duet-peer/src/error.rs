use crate::media::TrackKind;
use crate::session::SessionState;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaAcquisitionError {
    #[error("media device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("permission to use media devices was denied")]
    PermissionDenied,
}

/// The step of an offer/answer cycle that went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationStep {
    CreateConnection,
    AttachTracks,
    ParseDescription,
    ParseCandidate,
    CreateOffer,
    CreateAnswer,
    SetLocalDescription,
    SetRemoteDescription,
    AddCandidate,
    SendSignal,
}

impl fmt::Display for NegotiationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateConnection => "create connection",
            Self::AttachTracks => "attach tracks",
            Self::ParseDescription => "parse description",
            Self::ParseCandidate => "parse candidate",
            Self::CreateOffer => "create offer",
            Self::CreateAnswer => "create answer",
            Self::SetLocalDescription => "set local description",
            Self::SetRemoteDescription => "set remote description",
            Self::AddCandidate => "add candidate",
            Self::SendSignal => "send signal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    #[error("{step} failed: {reason}")]
    Step {
        step: NegotiationStep,
        reason: String,
    },

    #[error("negotiation did not complete within {0:?}")]
    Timeout(Duration),
}

impl NegotiationError {
    pub fn step(step: NegotiationStep, reason: impl fmt::Display) -> Self {
        Self::Step {
            step,
            reason: reason.to_string(),
        }
    }

    /// Wraps an `anyhow` chain, keeping every context layer in the reason.
    pub fn from_anyhow(step: NegotiationStep, err: &anyhow::Error) -> Self {
        Self::Step {
            step,
            reason: format!("{:#}", err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("failed to encode signaling message: {0}")]
    Encode(String),

    #[error("signaling channel is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Media(#[from] MediaAcquisitionError),

    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("cannot {action} while {state:?}")]
    InvalidState {
        state: SessionState,
        action: &'static str,
    },

    #[error("no local {0} track")]
    NoTrack(TrackKind),

    #[error("track replacement failed: {0}")]
    TrackReplacement(String),

    #[error("session has ended")]
    Ended,
}
