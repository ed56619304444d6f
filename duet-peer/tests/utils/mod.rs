
pub use mock_channel::*;
pub use mock_connection::*;
pub use mock_media::*;
