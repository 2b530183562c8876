use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "video")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub video_id: String,
    pub playlist_id: String,
    pub channel_id: String,
    pub video_name: String,
    pub video_description: String,
    pub tags: String,
    pub published_date: Option<String>,
    pub view_count: i64,
    pub like_count: i64,
    pub dislike_count: i64,
    pub favorite_count: i64,
    pub comment_count: i64,
    pub duration: Option<i64>,
    pub thumbnail: String,
    pub caption_status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::playlist::Entity",
        from = "Column::PlaylistId",
        to = "super::playlist::Column::PlaylistId",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Playlist,
    #[sea_orm(
        belongs_to = "super::channel::Entity",
        from = "Column::ChannelId",
        to = "super::channel::Column::ChannelId",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Channel,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::playlist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Playlist.def()
    }
}

impl Related<super::channel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Channel.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
