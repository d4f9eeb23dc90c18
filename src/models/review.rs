use serde::{Deserialize, Serialize};
use surrealdb::{sql::Thing, Datetime};

use crate::helpers::thing_helpers::thing_id;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReviewRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub music: Thing,
    pub user: Thing,
    pub note: u8,
    pub comment: String,
    pub date: Datetime,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReviewWithUser {
    pub id: Thing,
    pub music: Thing,
    pub user: Thing,
    pub user_name: Option<String>,
    pub note: u8,
    pub comment: String,
    pub date: Datetime,
}

#[derive(Debug, Serialize, Clone)]
pub struct ReviewView {
    pub id: String,
    pub music_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub note: u8,
    pub comment: String,
    pub date: Datetime,
}

impl From<ReviewRecord> for ReviewView {
    fn from(review: ReviewRecord) -> Self {
        Self {
            id: review.id.as_ref().map(thing_id).unwrap_or_default(),
            music_id: thing_id(&review.music),
            user_id: thing_id(&review.user),
            user_name: None,
            note: review.note,
            comment: review.comment,
            date: review.date,
        }
    }
}

impl From<ReviewWithUser> for ReviewView {
    fn from(review: ReviewWithUser) -> Self {
        Self {
            id: thing_id(&review.id),
            music_id: thing_id(&review.music),
            user_id: thing_id(&review.user),
            user_name: review.user_name,
            note: review.note,
            comment: review.comment,
            date: review.date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub note: Option<u8>,
    pub comment: Option<String>,
}
