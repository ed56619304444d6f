mod connection;
mod description;
mod ice;
mod room;
mod signaling;

pub use connection::ConnectionId;
pub use description::{CandidateInit, SdpKind, SessionDescription};
pub use ice::IceServerConfig;
pub use room::RoomCode;
pub use signaling::{ClientMessage, RelayMessage, Relayed, Routed};
