//! YouTube Data API v3 client: channel lookup, uploads-playlist pagination,
//! batched video details, per-video comment threads.

use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::bundle::{
    ChannelBundle, ChannelRecord, CommentRecord, PlaylistRecord, VideoRecord,
};
use crate::normalize;

const YOUTUBE_API: &str = "https://www.googleapis.com/youtube/v3";

/// Platform page-size cap for playlist enumeration.
const PLAYLIST_PAGE_SIZE: u32 = 50;
/// Platform cap on ids per videos.list call.
const VIDEO_BATCH_SIZE: usize = 50;
/// Top-level comments fetched per video.
const COMMENT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("channel not found: {0}")]
    NotFound(String),

    #[error("no videos found for channel {0}")]
    NoVideos(String),

    #[error("video detail lookup failed for id batch starting at {offset}: {message}")]
    ChunkFetch { offset: usize, message: String },

    #[error("platform API error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

// ============================================================================
// Wire models
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    snippet: ChannelSnippet,
    statistics: ChannelStatistics,
    content_details: ChannelContentDetails,
    status: ChannelStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelSnippet {
    title: String,
    #[serde(default)]
    description: String,
}

// Count fields arrive as decimal strings on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    view_count: Option<String>,
    subscriber_count: Option<String>,
    video_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatus {
    long_uploads_status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    statistics: VideoStatistics,
    content_details: VideoContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    published_at: Option<String>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    dislike_count: Option<String>,
    favorite_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoContentDetails {
    duration: Option<String>,
    caption: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadsResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThread {
    id: String,
    snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    text_display: String,
    #[serde(default)]
    author_display_name: String,
    published_at: Option<String>,
}

// ============================================================================
// Pagination
// ============================================================================

/// One page of a cursor-paginated listing.
pub(crate) struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

/// Follows continuation cursors until a page omits one, returning the union
/// of all pages' items. Issues exactly one request per page.
pub(crate) async fn walk_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, FetchError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, FetchError>>,
{
    let mut items = Vec::new();
    let mut cursor = None;

    loop {
        let page = fetch(cursor).await?;
        items.extend(page.items);
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(items)
}

// ============================================================================
// Client
// ============================================================================

#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    /// Fetches everything the warehouse needs for one channel: channel info,
    /// its uploads playlist, every video's details, and each video's
    /// top-level comments.
    pub async fn fetch_channel_bundle(
        &self,
        channel_id: &str,
    ) -> Result<ChannelBundle, FetchError> {
        let channel = self.fetch_channel(channel_id).await?;

        let video_ids = self
            .fetch_playlist_video_ids(&channel.uploads_playlist_id)
            .await?;
        if video_ids.is_empty() {
            return Err(FetchError::NoVideos(channel_id.to_string()));
        }
        debug!(count = video_ids.len(), "enumerated uploads playlist");

        let videos = self
            .fetch_video_details(&video_ids, &channel.uploads_playlist_id, channel_id)
            .await?;

        let mut comments = Vec::new();
        for video in &videos {
            // Best effort: a failed comment fetch costs that video its
            // comments, never the harvest.
            match self.fetch_comments(&video.video_id).await {
                Ok(mut fetched) => comments.append(&mut fetched),
                Err(err) => {
                    warn!(
                        video_id = %video.video_id,
                        error = %err,
                        "comment fetch failed, continuing with zero comments"
                    );
                }
            }
        }

        let playlists = vec![PlaylistRecord {
            playlist_id: channel.uploads_playlist_id.clone(),
            channel_id: channel_id.to_string(),
            playlist_name: "Uploads".to_string(),
        }];

        Ok(ChannelBundle {
            channel,
            playlists,
            videos,
            comments,
        })
    }

    async fn fetch_channel(&self, channel_id: &str) -> Result<ChannelRecord, FetchError> {
        let url = format!(
            "{YOUTUBE_API}/channels?part=snippet,statistics,contentDetails,status&id={}&key={}",
            urlencoding::encode(channel_id),
            self.api_key
        );

        let response: ChannelListResponse = self.get_json(&url).await?;
        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NotFound(channel_id.to_string()))?;

        let video_count = parse_count(item.statistics.video_count.as_deref());
        let is_active = video_count > 0;
        let is_verified = item.status.long_uploads_status.as_deref() == Some("eligible");

        Ok(ChannelRecord {
            channel_id: channel_id.to_string(),
            channel_name: item.snippet.title,
            channel_views: parse_count(item.statistics.view_count.as_deref()),
            channel_description: item.snippet.description,
            channel_status: if is_active { "active" } else { "inactive" }.to_string(),
            channel_verified_status: if is_verified {
                "verified"
            } else {
                "not verified"
            }
            .to_string(),
            subscriber_count: parse_count(item.statistics.subscriber_count.as_deref()),
            uploads_playlist_id: item.content_details.related_playlists.uploads,
        })
    }

    async fn fetch_playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>, FetchError> {
        walk_pages(|cursor| {
            let mut url = format!(
                "{YOUTUBE_API}/playlistItems?part=snippet&playlistId={}&maxResults={PLAYLIST_PAGE_SIZE}&key={}",
                urlencoding::encode(playlist_id),
                self.api_key
            );
            if let Some(token) = &cursor {
                url.push_str(&format!("&pageToken={token}"));
            }

            async move {
                let response: PlaylistItemsResponse = self.get_json(&url).await?;
                Ok(Page {
                    items: response
                        .items
                        .into_iter()
                        .map(|item| item.snippet.resource_id.video_id)
                        .collect(),
                    next_cursor: response.next_page_token,
                })
            }
        })
        .await
    }

    /// Looks up video details in id batches of at most [`VIDEO_BATCH_SIZE`].
    /// A failed batch aborts the fetch with [`FetchError::ChunkFetch`].
    async fn fetch_video_details(
        &self,
        video_ids: &[String],
        playlist_id: &str,
        channel_id: &str,
    ) -> Result<Vec<VideoRecord>, FetchError> {
        let mut records = Vec::with_capacity(video_ids.len());

        for (index, chunk) in video_ids.chunks(VIDEO_BATCH_SIZE).enumerate() {
            let offset = index * VIDEO_BATCH_SIZE;
            let url = format!(
                "{YOUTUBE_API}/videos?part=snippet,statistics,contentDetails&id={}&key={}",
                chunk.join(","),
                self.api_key
            );

            let response: VideoListResponse =
                self.get_json(&url)
                    .await
                    .map_err(|err| FetchError::ChunkFetch {
                        offset,
                        message: err.to_string(),
                    })?;

            records.extend(
                response
                    .items
                    .into_iter()
                    .map(|item| map_video(item, playlist_id, channel_id)),
            );
        }

        Ok(records)
    }

    async fn fetch_comments(&self, video_id: &str) -> Result<Vec<CommentRecord>, FetchError> {
        let url = format!(
            "{YOUTUBE_API}/commentThreads?part=snippet&videoId={}&maxResults={COMMENT_PAGE_SIZE}&textFormat=plainText&key={}",
            urlencoding::encode(video_id),
            self.api_key
        );

        let response: CommentThreadsResponse = self.get_json(&url).await?;

        Ok(response
            .items
            .into_iter()
            .map(|thread| {
                let snippet = thread.snippet.top_level_comment.snippet;
                CommentRecord {
                    comment_id: thread.id,
                    video_id: video_id.to_string(),
                    comment_text: snippet.text_display,
                    comment_author: snippet.author_display_name,
                    comment_published_date: normalize_timestamp(
                        snippet.published_at.as_deref(),
                        "comment",
                        video_id,
                    ),
                }
            })
            .collect())
    }
}

/// Shapes one wire video into a flat record. A duration or timestamp that
/// fails to parse nulls that field; the video itself always survives.
fn map_video(item: VideoItem, playlist_id: &str, channel_id: &str) -> VideoRecord {
    let duration = item.content_details.duration.as_deref().and_then(|raw| {
        match normalize::iso_duration_to_seconds(raw) {
            Ok(seconds) => Some(seconds),
            Err(err) => {
                warn!(video_id = %item.id, error = %err, "unparseable duration, storing null");
                None
            }
        }
    });

    VideoRecord {
        published_date: normalize_timestamp(item.snippet.published_at.as_deref(), "video", &item.id),
        video_id: item.id,
        playlist_id: playlist_id.to_string(),
        channel_id: channel_id.to_string(),
        video_name: item.snippet.title,
        video_description: item.snippet.description,
        tags: normalize::join_tags(&item.snippet.tags),
        view_count: parse_count(item.statistics.view_count.as_deref()),
        like_count: parse_count(item.statistics.like_count.as_deref()),
        dislike_count: parse_count(item.statistics.dislike_count.as_deref()),
        favorite_count: parse_count(item.statistics.favorite_count.as_deref()),
        comment_count: parse_count(item.statistics.comment_count.as_deref()),
        duration,
        thumbnail: item
            .snippet
            .thumbnails
            .default
            .map(|t| t.url)
            .unwrap_or_default(),
        caption_status: item.content_details.caption.unwrap_or_default(),
    }
}

fn normalize_timestamp(raw: Option<&str>, kind: &str, id: &str) -> Option<String> {
    match normalize::iso_timestamp_to_storage(raw.unwrap_or_default()) {
        Ok(storage) => storage,
        Err(err) => {
            warn!(%kind, %id, error = %err, "unparseable timestamp, storing null");
            None
        }
    }
}

/// Wire counts are decimal strings; absent or malformed counts read as zero,
/// matching how the warehouse has always treated them.
fn parse_count(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}
