pub use duet_core::model::{ConnectionId, RoomCode};

pub mod model {
    pub use duet_core::model::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use duet_relay::*;
}

#[cfg(feature = "peer")]
pub mod peer {
    pub use duet_peer::*;
}
