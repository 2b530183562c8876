//! Full-replace persistence of a harvested channel bundle.

use std::collections::HashSet;
use std::fmt;

use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::entities::{channel, comment, playlist, prelude::*, video};
use crate::models::bundle::ChannelBundle;

/// Hard failures that roll the replace transaction back. Duplicate keys and
/// orphan comments are [`StoreWarning`]s, never errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Recovered conditions surfaced to the caller after a replace cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWarning {
    /// The channel row already existed; the stale row was kept as-is.
    DuplicateChannel { channel_id: String },
    /// Playlist rows skipped on unique-key conflict.
    DuplicatePlaylists { skipped: u64 },
    /// Video rows skipped on unique-key conflict.
    DuplicateVideos { skipped: u64 },
    /// Comment rows skipped on unique-key conflict.
    DuplicateComments { skipped: u64 },
    /// Comments referencing videos absent from this batch were dropped.
    OrphanComments {
        dropped: u64,
        missing_video_ids: Vec<String>,
    },
}

impl fmt::Display for StoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateChannel { channel_id } => {
                write!(f, "channel {channel_id} already exists, row left unchanged")
            }
            Self::DuplicatePlaylists { skipped } => {
                write!(f, "{skipped} playlist row(s) already exist, skipped")
            }
            Self::DuplicateVideos { skipped } => {
                write!(f, "{skipped} video row(s) already exist, skipped")
            }
            Self::DuplicateComments { skipped } => {
                write!(f, "{skipped} comment row(s) already exist, skipped")
            }
            Self::OrphanComments {
                dropped,
                missing_video_ids,
            } => write!(
                f,
                "dropped {dropped} comment(s) referencing missing video ids: {}",
                missing_video_ids.join(", ")
            ),
        }
    }
}

/// Outcome of one replace cycle: rows written per table plus anything that
/// was recovered along the way.
#[derive(Debug, Default)]
pub struct StoreReport {
    pub channels_inserted: u64,
    pub playlists_inserted: u64,
    pub videos_inserted: u64,
    pub comments_inserted: u64,
    pub warnings: Vec<StoreWarning>,
}

/// Repository for the harvest write path.
pub struct HarvestRepository {
    conn: DatabaseConnection,
}

impl HarvestRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Replaces everything stored for the bundle's channel with the bundle's
    /// contents, inside a single transaction. Any hard failure rolls the
    /// whole cycle back, so the store never holds a mix of old and new rows.
    pub async fn replace_channel_data(
        &self,
        bundle: &ChannelBundle,
    ) -> Result<StoreReport, StoreError> {
        let txn = self.conn.begin().await?;
        let mut report = StoreReport::default();

        self.delete_channel_data(&txn, &bundle.channel.channel_id)
            .await?;

        self.insert_channel(&txn, bundle, &mut report).await?;
        self.insert_playlists(&txn, bundle, &mut report).await?;
        self.insert_videos(&txn, bundle, &mut report).await?;
        self.insert_comments(&txn, bundle, &mut report).await?;

        txn.commit().await?;

        info!(
            channel_id = %bundle.channel.channel_id,
            playlists = report.playlists_inserted,
            videos = report.videos_inserted,
            comments = report.comments_inserted,
            warnings = report.warnings.len(),
            "channel data replaced"
        );

        Ok(report)
    }

    /// Deletes prior rows child-before-parent: comments, then videos, then
    /// playlists. The channel row itself survives, which is why a re-harvest
    /// reports a duplicate-channel warning. Foreign keys are enforced, so a
    /// wrong-ordered delete fails loudly instead of cascading silently.
    async fn delete_channel_data(
        &self,
        txn: &DatabaseTransaction,
        channel_id: &str,
    ) -> Result<(), StoreError> {
        let playlist_ids: Vec<String> = Playlist::find()
            .filter(playlist::Column::ChannelId.eq(channel_id))
            .all(txn)
            .await?
            .into_iter()
            .map(|p| p.playlist_id)
            .collect();

        if playlist_ids.is_empty() {
            return Ok(());
        }

        let video_ids: Vec<String> = Video::find()
            .filter(video::Column::PlaylistId.is_in(playlist_ids.clone()))
            .all(txn)
            .await?
            .into_iter()
            .map(|v| v.video_id)
            .collect();

        if !video_ids.is_empty() {
            Comment::delete_many()
                .filter(comment::Column::VideoId.is_in(video_ids))
                .exec(txn)
                .await?;

            Video::delete_many()
                .filter(video::Column::PlaylistId.is_in(playlist_ids))
                .exec(txn)
                .await?;
        }

        Playlist::delete_many()
            .filter(playlist::Column::ChannelId.eq(channel_id))
            .exec(txn)
            .await?;

        Ok(())
    }

    async fn insert_channel(
        &self,
        txn: &DatabaseTransaction,
        bundle: &ChannelBundle,
        report: &mut StoreReport,
    ) -> Result<(), StoreError> {
        let record = &bundle.channel;
        let model = channel::ActiveModel {
            channel_id: Set(record.channel_id.clone()),
            channel_name: Set(record.channel_name.clone()),
            channel_views: Set(record.channel_views),
            channel_description: Set(record.channel_description.clone()),
            channel_status: Set(record.channel_status.clone()),
            channel_verified_status: Set(record.channel_verified_status.clone()),
        };

        let inserted = Channel::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(channel::Column::ChannelId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        report.channels_inserted = inserted;
        if inserted == 0 {
            warn!(channel_id = %record.channel_id, "channel already present, keeping existing row");
            report.warnings.push(StoreWarning::DuplicateChannel {
                channel_id: record.channel_id.clone(),
            });
        }

        Ok(())
    }

    async fn insert_playlists(
        &self,
        txn: &DatabaseTransaction,
        bundle: &ChannelBundle,
        report: &mut StoreReport,
    ) -> Result<(), StoreError> {
        if bundle.playlists.is_empty() {
            return Ok(());
        }

        let models = bundle.playlists.iter().map(|p| playlist::ActiveModel {
            playlist_id: Set(p.playlist_id.clone()),
            channel_id: Set(p.channel_id.clone()),
            playlist_name: Set(p.playlist_name.clone()),
        });

        let inserted = Playlist::insert_many(models)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(playlist::Column::PlaylistId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        report.playlists_inserted = inserted;
        let skipped = bundle.playlists.len() as u64 - inserted;
        if skipped > 0 {
            report
                .warnings
                .push(StoreWarning::DuplicatePlaylists { skipped });
        }

        Ok(())
    }

    async fn insert_videos(
        &self,
        txn: &DatabaseTransaction,
        bundle: &ChannelBundle,
        report: &mut StoreReport,
    ) -> Result<(), StoreError> {
        if bundle.videos.is_empty() {
            return Ok(());
        }

        let models = bundle.videos.iter().map(|v| video::ActiveModel {
            video_id: Set(v.video_id.clone()),
            playlist_id: Set(v.playlist_id.clone()),
            channel_id: Set(v.channel_id.clone()),
            video_name: Set(v.video_name.clone()),
            video_description: Set(v.video_description.clone()),
            tags: Set(v.tags.clone()),
            published_date: Set(v.published_date.clone()),
            view_count: Set(v.view_count),
            like_count: Set(v.like_count),
            dislike_count: Set(v.dislike_count),
            favorite_count: Set(v.favorite_count),
            comment_count: Set(v.comment_count),
            duration: Set(v.duration),
            thumbnail: Set(v.thumbnail.clone()),
            caption_status: Set(v.caption_status.clone()),
        });

        let inserted = Video::insert_many(models)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(video::Column::VideoId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        report.videos_inserted = inserted;
        let skipped = bundle.videos.len() as u64 - inserted;
        if skipped > 0 {
            report
                .warnings
                .push(StoreWarning::DuplicateVideos { skipped });
        }

        Ok(())
    }

    /// Filters out comments whose video is absent from this batch before
    /// inserting; the referential check happens here rather than as a
    /// foreign-key failure so the rest of the batch still lands.
    async fn insert_comments(
        &self,
        txn: &DatabaseTransaction,
        bundle: &ChannelBundle,
        report: &mut StoreReport,
    ) -> Result<(), StoreError> {
        let batch_video_ids: HashSet<&str> =
            bundle.videos.iter().map(|v| v.video_id.as_str()).collect();

        let (kept, orphans): (Vec<_>, Vec<_>) = bundle
            .comments
            .iter()
            .partition(|c| batch_video_ids.contains(c.video_id.as_str()));

        if !orphans.is_empty() {
            let mut missing_video_ids: Vec<String> =
                orphans.iter().map(|c| c.video_id.clone()).collect();
            missing_video_ids.sort();
            missing_video_ids.dedup();

            warn!(
                dropped = orphans.len(),
                missing = ?missing_video_ids,
                "dropping comments referencing videos absent from this batch"
            );
            report.warnings.push(StoreWarning::OrphanComments {
                dropped: orphans.len() as u64,
                missing_video_ids,
            });
        }

        if kept.is_empty() {
            return Ok(());
        }

        let attempted = kept.len() as u64;
        let models = kept.into_iter().map(|c| comment::ActiveModel {
            comment_id: Set(c.comment_id.clone()),
            video_id: Set(c.video_id.clone()),
            comment_text: Set(c.comment_text.clone()),
            comment_author: Set(c.comment_author.clone()),
            comment_published_date: Set(c.comment_published_date.clone()),
        });

        let inserted = Comment::insert_many(models)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(comment::Column::CommentId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        report.comments_inserted = inserted;
        let skipped = attempted - inserted;
        if skipped > 0 {
            report
                .warnings
                .push(StoreWarning::DuplicateComments { skipped });
        }

        Ok(())
    }
}
