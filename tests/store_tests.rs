//! Integration tests for the full-replace store cycle and the query catalog,
//! against an in-memory SQLite store.

use sea_orm::EntityTrait;

use tubevault::db::{Store, StoreWarning};
use tubevault::entities::prelude::{Channel, Comment, Playlist, Video};
use tubevault::models::bundle::{
    ChannelBundle, ChannelRecord, CommentRecord, PlaylistRecord, VideoRecord,
};

async fn memory_store() -> Store {
    // Single connection: every pooled connection would otherwise get its
    // own private in-memory database.
    Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("failed to open in-memory store")
}

fn test_video(channel_id: &str, playlist_id: &str, n: usize) -> VideoRecord {
    VideoRecord {
        video_id: format!("vid-{n}"),
        playlist_id: playlist_id.to_string(),
        channel_id: channel_id.to_string(),
        video_name: format!("Video {n}"),
        video_description: String::new(),
        tags: "tag1,tag2".to_string(),
        published_date: Some(format!("{}-06-15 12:00:00", 2020 + (n % 3))),
        view_count: (n as i64 + 1) * 100,
        like_count: n as i64 * 10,
        dislike_count: 0,
        favorite_count: 0,
        comment_count: 2,
        duration: Some(60 + n as i64),
        thumbnail: String::new(),
        caption_status: "false".to_string(),
    }
}

fn test_comment(video_id: &str, n: usize) -> CommentRecord {
    CommentRecord {
        comment_id: format!("{video_id}-c{n}"),
        video_id: video_id.to_string(),
        comment_text: format!("comment {n}"),
        comment_author: "someone".to_string(),
        comment_published_date: Some("2022-01-01 00:00:00".to_string()),
    }
}

fn test_bundle(channel_id: &str, video_count: usize) -> ChannelBundle {
    let playlist_id = format!("UU-{channel_id}");
    let videos: Vec<VideoRecord> = (0..video_count)
        .map(|n| test_video(channel_id, &playlist_id, n))
        .collect();
    let comments = videos
        .iter()
        .flat_map(|v| (0..2).map(|n| test_comment(&v.video_id, n)))
        .collect();

    ChannelBundle {
        channel: ChannelRecord {
            channel_id: channel_id.to_string(),
            channel_name: format!("Channel {channel_id}"),
            channel_views: 10_000,
            channel_description: String::new(),
            channel_status: "active".to_string(),
            channel_verified_status: "verified".to_string(),
            subscriber_count: 500,
            uploads_playlist_id: playlist_id.clone(),
        },
        playlists: vec![PlaylistRecord {
            playlist_id,
            channel_id: channel_id.to_string(),
            playlist_name: "Uploads".to_string(),
        }],
        videos,
        comments,
    }
}

async fn row_counts(store: &Store) -> (usize, usize, usize, usize) {
    (
        Channel::find().all(&store.conn).await.unwrap().len(),
        Playlist::find().all(&store.conn).await.unwrap().len(),
        Video::find().all(&store.conn).await.unwrap().len(),
        Comment::find().all(&store.conn).await.unwrap().len(),
    )
}

#[tokio::test]
async fn replace_persists_all_entity_types() {
    let store = memory_store().await;
    let bundle = test_bundle("UC123", 3);

    let report = store.replace_channel_data(&bundle).await.unwrap();

    assert_eq!(report.channels_inserted, 1);
    assert_eq!(report.playlists_inserted, 1);
    assert_eq!(report.videos_inserted, 3);
    assert_eq!(report.comments_inserted, 6);
    assert!(report.warnings.is_empty());
    assert_eq!(row_counts(&store).await, (1, 1, 3, 6));
}

#[tokio::test]
async fn replace_twice_is_idempotent() {
    let store = memory_store().await;
    let bundle = test_bundle("UC123", 3);

    store.replace_channel_data(&bundle).await.unwrap();
    let first_counts = row_counts(&store).await;

    let report = store.replace_channel_data(&bundle).await.unwrap();

    // The channel row survives the delete cascade, so the second cycle
    // reports it as a duplicate; every other table is rewritten fresh.
    assert_eq!(row_counts(&store).await, first_counts);
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        StoreWarning::DuplicateChannel { channel_id } if channel_id == "UC123"
    )));
    assert_eq!(report.videos_inserted, 3);
    assert_eq!(report.comments_inserted, 6);
}

#[tokio::test]
async fn replace_leaves_no_stale_rows() {
    let store = memory_store().await;

    let mut old = test_bundle("UC123", 2);
    old.videos[0].video_id = "old-video".to_string();
    old.comments = vec![test_comment("old-video", 0)];
    store.replace_channel_data(&old).await.unwrap();

    let fresh = test_bundle("UC123", 4);
    store.replace_channel_data(&fresh).await.unwrap();

    let videos = Video::find().all(&store.conn).await.unwrap();
    assert_eq!(videos.len(), 4);
    assert!(videos.iter().all(|v| v.video_id != "old-video"));

    let comments = Comment::find().all(&store.conn).await.unwrap();
    assert!(comments.iter().all(|c| c.video_id != "old-video"));
}

#[tokio::test]
async fn orphan_comments_are_dropped_with_a_warning() {
    let store = memory_store().await;

    // 3 videos, 5 comments, one referencing a video missing from the batch.
    let mut bundle = test_bundle("UC123", 3);
    bundle.comments = vec![
        test_comment("vid-0", 0),
        test_comment("vid-0", 1),
        test_comment("vid-1", 0),
        test_comment("vid-2", 0),
        test_comment("vid-404", 0),
    ];

    let report = store.replace_channel_data(&bundle).await.unwrap();

    assert_eq!(report.comments_inserted, 4);
    assert_eq!(Comment::find().all(&store.conn).await.unwrap().len(), 4);

    let orphan_warning = report
        .warnings
        .iter()
        .find_map(|w| match w {
            StoreWarning::OrphanComments {
                dropped,
                missing_video_ids,
            } => Some((dropped, missing_video_ids)),
            _ => None,
        })
        .expect("expected an orphan-comment warning");
    assert_eq!(*orphan_warning.0, 1);
    assert_eq!(orphan_warning.1, &vec!["vid-404".to_string()]);

    // The invariant behind the filter: nothing persisted points at a video
    // that is not itself persisted.
    let stored_videos: Vec<String> = Video::find()
        .all(&store.conn)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.video_id)
        .collect();
    for comment in Comment::find().all(&store.conn).await.unwrap() {
        assert!(stored_videos.contains(&comment.video_id));
    }
}

#[tokio::test]
async fn independent_channels_do_not_interfere() {
    let store = memory_store().await;

    store
        .replace_channel_data(&test_bundle("UC-alpha", 2))
        .await
        .unwrap();
    store
        .replace_channel_data(&test_bundle("UC-beta", 3))
        .await
        .unwrap();

    // Re-harvesting alpha must leave beta untouched.
    store
        .replace_channel_data(&test_bundle("UC-alpha", 1))
        .await
        .unwrap();

    assert_eq!(row_counts(&store).await, (2, 2, 4, 8));
}

#[tokio::test]
async fn top_ten_query_returns_ten_rows_descending() {
    let store = memory_store().await;
    store
        .replace_channel_data(&test_bundle("UC123", 15))
        .await
        .unwrap();

    let table = store
        .run_query("Top 10 most viewed videos and their respective channels")
        .await
        .unwrap();

    assert_eq!(table.columns, vec!["video_name", "channel_name", "view_count"]);
    assert_eq!(table.rows.len(), 10);

    let views: Vec<i64> = table
        .rows
        .iter()
        .map(|row| row[2].as_i64().expect("view_count should be an integer"))
        .collect();
    assert!(views.windows(2).all(|w| w[0] >= w[1]));
    // Highest view count in a 15-video bundle is 15 * 100.
    assert_eq!(views[0], 1500);
}

#[tokio::test]
async fn comment_count_query_groups_per_video() {
    let store = memory_store().await;
    store
        .replace_channel_data(&test_bundle("UC123", 3))
        .await
        .unwrap();

    let table = store
        .run_query("Number of comments on each video and their corresponding video names")
        .await
        .unwrap();

    assert_eq!(table.rows.len(), 3);
    for row in &table.rows {
        assert_eq!(row[1].as_i64(), Some(2));
    }
}

#[tokio::test]
async fn year_filter_query_uses_published_date() {
    let store = memory_store().await;

    let mut bundle = test_bundle("UC123", 1);
    bundle.videos[0].published_date = Some("2022-05-01 10:00:00".to_string());
    store.replace_channel_data(&bundle).await.unwrap();

    let mut other = test_bundle("UC-other", 1);
    other.videos[0].published_date = Some("2019-05-01 10:00:00".to_string());
    store.replace_channel_data(&other).await.unwrap();

    let table = store
        .run_query("Names of all channels that have published videos in the year 2022")
        .await
        .unwrap();

    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0][0].as_str(), Some("Channel UC123"));
}

#[tokio::test]
async fn unknown_query_is_rejected() {
    let store = memory_store().await;

    let err = store.run_query("SELECT * FROM secrets").await.unwrap_err();
    assert!(err.to_string().contains("unknown query"));
}

#[tokio::test]
async fn query_catalog_lists_ten_queries() {
    let names = Store::query_names();
    assert_eq!(names.len(), 10);
    for name in names {
        let store = memory_store().await;
        // Every catalog entry must execute against an empty store.
        let table = store.run_query(name).await.unwrap();
        assert!(table.rows.is_empty());
    }
}
