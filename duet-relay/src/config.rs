use std::net::{Ipv4Addr, SocketAddr};

/// Where the relay listens.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_address: SocketAddr,
    /// Route the WebSocket upgrade is served on.
    pub ws_path: String,
}

impl RelayConfig {
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            ..Self::default()
        }
    }

    pub fn with_ws_path(mut self, ws_path: impl Into<String>) -> Self {
        self.ws_path = ws_path.into();
        self
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3000)),
            ws_path: "/ws".to_string(),
        }
    }
}
