pub mod config;
pub mod room;
pub mod server;
pub mod signaling;

pub use config::*;
pub use room::*;
pub use server::*;
pub use signaling::*;
