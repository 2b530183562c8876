//! Flat harvest records: the in-memory result of one fetch cycle, shaped
//! for persistence but not yet persisted.

use serde::{Deserialize, Serialize};

/// Everything one fetch cycle produced for a channel. The caller holds this
/// value and passes it explicitly to the store; there is no ambient
/// "last fetched" slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelBundle {
    pub channel: ChannelRecord,
    /// Always exactly one entry: the channel's uploads playlist.
    pub playlists: Vec<PlaylistRecord>,
    pub videos: Vec<VideoRecord>,
    pub comments: Vec<CommentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub channel_id: String,
    pub channel_name: String,
    pub channel_views: i64,
    pub channel_description: String,
    /// "active" when the channel has at least one upload, else "inactive".
    pub channel_status: String,
    pub channel_verified_status: String,
    /// Fetched for display only; never persisted.
    pub subscriber_count: i64,
    pub uploads_playlist_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub playlist_id: String,
    pub channel_id: String,
    pub playlist_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub playlist_id: String,
    pub channel_id: String,
    pub video_name: String,
    pub video_description: String,
    /// Comma-joined tag list; empty string when the video has no tags.
    pub tags: String,
    /// Storage-layout timestamp; `None` when absent or unparseable.
    pub published_date: Option<String>,
    pub view_count: i64,
    pub like_count: i64,
    pub dislike_count: i64,
    pub favorite_count: i64,
    pub comment_count: i64,
    /// Duration in whole seconds; `None` when the wire value failed to parse.
    pub duration: Option<i64>,
    pub thumbnail: String,
    pub caption_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub comment_id: String,
    pub video_id: String,
    pub comment_text: String,
    pub comment_author: String,
    pub comment_published_date: Option<String>,
}
