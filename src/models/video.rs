use serde::{Deserialize, Serialize};
use surrealdb::{sql::Thing, Datetime};

use crate::helpers::thing_helpers::thing_id;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoComment {
    pub user: Thing,
    pub text: String,
    pub created_at: Datetime,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub artist: Thing,
    #[serde(default)]
    pub is_validated: bool,
    #[serde(default)]
    pub likes: Vec<Thing>,
    #[serde(default)]
    pub comments: Vec<VideoComment>,
    pub created_at: Datetime,
}

/// Row shape of feed queries that also fetch the artist's name and avatar.
#[derive(Debug, Deserialize, Clone)]
pub struct VideoWithArtist {
    pub id: Thing,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub artist: Thing,
    pub artist_name: Option<String>,
    pub artist_avatar: Option<String>,
    #[serde(default)]
    pub is_validated: bool,
    #[serde(default)]
    pub likes: Vec<Thing>,
    #[serde(default)]
    pub comments: Vec<VideoComment>,
    pub created_at: Datetime,
}

#[derive(Debug, Serialize, Clone)]
pub struct VideoView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub artist_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_avatar: Option<String>,
    pub is_validated: bool,
    pub likes: Vec<String>,
    pub comments_count: usize,
    pub created_at: Datetime,
}

impl From<VideoRecord> for VideoView {
    fn from(video: VideoRecord) -> Self {
        Self {
            id: video.id.as_ref().map(thing_id).unwrap_or_default(),
            title: video.title,
            description: video.description,
            url: video.url,
            artist_id: thing_id(&video.artist),
            artist_name: None,
            artist_avatar: None,
            is_validated: video.is_validated,
            likes: video.likes.iter().map(thing_id).collect(),
            comments_count: video.comments.len(),
            created_at: video.created_at,
        }
    }
}

impl From<VideoWithArtist> for VideoView {
    fn from(video: VideoWithArtist) -> Self {
        Self {
            id: thing_id(&video.id),
            title: video.title,
            description: video.description,
            url: video.url,
            artist_id: thing_id(&video.artist),
            artist_name: video.artist_name,
            artist_avatar: video.artist_avatar,
            is_validated: video.is_validated,
            likes: video.likes.iter().map(thing_id).collect(),
            comments_count: video.comments.len(),
            created_at: video.created_at,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct CommentView {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,
    pub text: String,
    pub created_at: Datetime,
}

impl From<VideoComment> for CommentView {
    fn from(comment: VideoComment) -> Self {
        Self {
            user_id: thing_id(&comment.user),
            user_name: None,
            user_avatar: None,
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateVideoPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVideoPayload {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AdminVideoQuery {
    pub validated: Option<bool>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct VideoStats {
    pub likes: usize,
    pub comments: usize,
}
