mod local_media;
mod sink;
mod source;
mod track;

pub use local_media::*;
pub use sink::*;
pub use source::*;
pub use track::*;
