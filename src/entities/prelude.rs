pub use super::channel::Entity as Channel;
pub use super::comment::Entity as Comment;
pub use super::playlist::Entity as Playlist;
pub use super::video::Entity as Video;
