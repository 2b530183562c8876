//! Fixed catalog of named, read-only aggregation queries.

use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, JsonValue, Statement};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown query: {0:?}")]
    UnknownQuery(String),

    #[error("query execution failed: {0}")]
    Execution(#[from] sea_orm::DbErr),
}

/// One catalog entry: a human-readable name, the statement, and the output
/// columns in display order.
struct CatalogQuery {
    name: &'static str,
    columns: &'static [&'static str],
    sql: &'static str,
}

/// Tabular result of one catalog query.
#[derive(Debug)]
pub struct QueryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<JsonValue>>,
}

// The ten canned analytics queries, keyed by the names the shell shows.
// Year extraction uses strftime since the store is SQLite.
const CATALOG: &[CatalogQuery] = &[
    CatalogQuery {
        name: "Names of all the videos and their corresponding channels",
        columns: &["video_name", "channel_name"],
        sql: "SELECT video.video_name, channel.channel_name \
              FROM video \
              JOIN channel ON video.channel_id = channel.channel_id",
    },
    CatalogQuery {
        name: "Channels with the most number of videos and their count",
        columns: &["channel_name", "video_count"],
        sql: "SELECT channel.channel_name, COUNT(video.video_id) AS video_count \
              FROM video \
              JOIN channel ON video.channel_id = channel.channel_id \
              GROUP BY channel.channel_id \
              ORDER BY video_count DESC",
    },
    CatalogQuery {
        name: "Top 10 most viewed videos and their respective channels",
        columns: &["video_name", "channel_name", "view_count"],
        sql: "SELECT video.video_name, channel.channel_name, video.view_count \
              FROM video \
              JOIN channel ON video.channel_id = channel.channel_id \
              ORDER BY video.view_count DESC \
              LIMIT 10",
    },
    CatalogQuery {
        name: "Number of comments on each video and their corresponding video names",
        columns: &["video_name", "comment_count"],
        sql: "SELECT video.video_name, COUNT(comment.comment_id) AS comment_count \
              FROM comment \
              JOIN video ON comment.video_id = video.video_id \
              GROUP BY video.video_id",
    },
    CatalogQuery {
        name: "Videos with the highest number of likes and their corresponding channel names",
        columns: &["video_name", "channel_name", "like_count"],
        sql: "SELECT video.video_name, channel.channel_name, video.like_count \
              FROM video \
              JOIN channel ON video.channel_id = channel.channel_id \
              ORDER BY video.like_count DESC \
              LIMIT 10",
    },
    CatalogQuery {
        name: "Total number of likes and dislikes for each video and their corresponding video names",
        columns: &["video_name", "like_count", "dislike_count"],
        sql: "SELECT video.video_name, video.like_count, video.dislike_count FROM video",
    },
    CatalogQuery {
        name: "Total number of views for each channel and their corresponding channel names",
        columns: &["channel_name", "channel_views"],
        sql: "SELECT channel.channel_name, channel.channel_views FROM channel",
    },
    CatalogQuery {
        name: "Names of all channels that have published videos in the year 2022",
        columns: &["channel_name"],
        sql: "SELECT DISTINCT channel.channel_name \
              FROM video \
              JOIN channel ON video.channel_id = channel.channel_id \
              WHERE strftime('%Y', video.published_date) = '2022'",
    },
    CatalogQuery {
        name: "Average duration of all videos in each channel and their corresponding channel names",
        columns: &["channel_name", "avg_duration"],
        sql: "SELECT channel.channel_name, AVG(video.duration) AS avg_duration \
              FROM video \
              JOIN channel ON video.channel_id = channel.channel_id \
              GROUP BY channel.channel_id",
    },
    CatalogQuery {
        name: "Videos with the highest number of comments and their corresponding channel names",
        columns: &["video_name", "channel_name", "comment_count"],
        sql: "SELECT video.video_name, channel.channel_name, COUNT(comment.comment_id) AS comment_count \
              FROM comment \
              JOIN video ON comment.video_id = video.video_id \
              JOIN channel ON video.channel_id = channel.channel_id \
              GROUP BY video.video_id \
              ORDER BY comment_count DESC \
              LIMIT 10",
    },
];

/// Repository for the read-only analytics path.
pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Names of every catalog query, in catalog order.
    pub fn query_names() -> Vec<&'static str> {
        CATALOG.iter().map(|q| q.name).collect()
    }

    pub async fn run_query(&self, name: &str) -> Result<QueryTable, QueryError> {
        let entry = CATALOG
            .iter()
            .find(|q| q.name == name)
            .ok_or_else(|| QueryError::UnknownQuery(name.to_string()))?;

        let backend = self.conn.get_database_backend();
        let stmt = Statement::from_string(backend, entry.sql.to_string());

        let json_rows = JsonValue::find_by_statement(stmt).all(&self.conn).await?;

        let rows = json_rows
            .into_iter()
            .map(|row| {
                entry
                    .columns
                    .iter()
                    .map(|col| row.get(*col).cloned().unwrap_or(JsonValue::Null))
                    .collect()
            })
            .collect();

        Ok(QueryTable {
            columns: entry.columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
        })
    }
}
