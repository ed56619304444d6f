mod connection;
mod connection_event;
mod rtc_connection;

pub use connection::*;
pub use connection_event::*;
pub use rtc_connection::*;
