use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct AdminStats {
    pub user_count: u64,
    pub music_count: u64,
    pub review_count: u64,
    pub video_count: u64,
    pub pending_video_count: u64,
}
