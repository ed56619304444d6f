use crate::model::description::{CandidateInit, SessionDescription};
use crate::model::room::RoomCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload a client attaches to negotiation messages: the target room plus an
/// opaque body the relay never looks into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routed {
    pub room: RoomCode,
    /// A missing body is carried as `null`.
    #[serde(default)]
    pub data: Value,
}

impl Routed {
    pub fn new<T: Serialize>(room: RoomCode, data: &T) -> serde_json::Result<Self> {
        Ok(Self {
            room,
            data: serde_json::to_value(data)?,
        })
    }
}

/// The same body with routing metadata removed, as delivered to the other member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relayed {
    #[serde(default)]
    pub data: Value,
}

/// Messages sent by a participant to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom(RoomCode),
    Offer(Routed),
    Answer(Routed),
    Candidate(Routed),
}

impl ClientMessage {
    pub fn offer(room: RoomCode, offer: &SessionDescription) -> serde_json::Result<Self> {
        Ok(Self::Offer(Routed::new(room, offer)?))
    }

    pub fn answer(room: RoomCode, answer: &SessionDescription) -> serde_json::Result<Self> {
        Ok(Self::Answer(Routed::new(room, answer)?))
    }

    pub fn candidate(room: RoomCode, candidate: &CandidateInit) -> serde_json::Result<Self> {
        Ok(Self::Candidate(Routed::new(room, candidate)?))
    }

    /// Splits a negotiation message into its target room and the stripped
    /// message for the other member. `JoinRoom` is not relayed.
    pub fn into_relayed(self) -> Option<(RoomCode, RelayMessage)> {
        match self {
            Self::JoinRoom(_) => None,
            Self::Offer(Routed { room, data }) => {
                Some((room, RelayMessage::Offer(Relayed { data })))
            }
            Self::Answer(Routed { room, data }) => {
                Some((room, RelayMessage::Answer(Relayed { data })))
            }
            Self::Candidate(Routed { room, data }) => {
                Some((room, RelayMessage::Candidate(Relayed { data })))
            }
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Self::JoinRoom(_) => "join-room",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::Candidate(_) => "candidate",
        }
    }
}

/// Messages the relay sends to participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum RelayMessage {
    Ready,
    Offer(Relayed),
    Answer(Relayed),
    Candidate(Relayed),
    RoomFull(RoomCode),
}

impl RelayMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::Candidate(_) => "candidate",
            Self::RoomFull(_) => "room-full",
        }
    }
}
