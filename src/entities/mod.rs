pub mod prelude;

pub mod channel;
pub mod comment;
pub mod playlist;
pub mod video;
