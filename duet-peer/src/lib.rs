pub mod channel;
pub mod config;
pub mod error;
pub mod media;
pub mod session;
pub mod transport;

pub use channel::*;
pub use config::*;
pub use error::*;
pub use media::*;
pub use session::*;
pub use transport::*;
