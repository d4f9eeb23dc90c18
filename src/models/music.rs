use serde::{Deserialize, Serialize};
use surrealdb::{sql::Thing, Datetime};

use crate::{helpers::thing_helpers::thing_id, services::entitlement_service::PlaybackWindow};

/// Lowest price (F CFA) a track can be listed at.
pub const MIN_MUSIC_PRICE: u32 = 200;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MusicRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub title: String,
    pub genre: String,
    pub price: u32,
    pub description: String,
    pub cover_url: String,
    pub audio_url: String,
    pub artist: Thing,
    #[serde(default)]
    pub streams: u64,
    pub created_at: Datetime,
}

/// Row shape of catalog queries that also fetch the artist's name.
#[derive(Debug, Deserialize, Clone)]
pub struct MusicWithArtist {
    pub id: Thing,
    pub title: String,
    pub genre: String,
    pub price: u32,
    pub description: String,
    pub cover_url: String,
    pub audio_url: String,
    pub artist: Thing,
    pub artist_name: Option<String>,
    #[serde(default)]
    pub streams: u64,
    pub created_at: Datetime,
}

#[derive(Debug, Serialize, Clone)]
pub struct MusicView {
    pub id: String,
    pub title: String,
    pub genre: String,
    pub price: u32,
    pub description: String,
    pub cover_url: String,
    pub audio_url: String,
    pub artist_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    pub streams: u64,
    pub created_at: Datetime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bought: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback: Option<PlaybackWindow>,
}

impl From<MusicWithArtist> for MusicView {
    fn from(music: MusicWithArtist) -> Self {
        Self {
            id: thing_id(&music.id),
            title: music.title,
            genre: music.genre,
            price: music.price,
            description: music.description,
            cover_url: music.cover_url,
            audio_url: music.audio_url,
            artist_id: thing_id(&music.artist),
            artist_name: music.artist_name,
            streams: music.streams,
            created_at: music.created_at,
            is_bought: None,
            playback: None,
        }
    }
}

impl From<MusicRecord> for MusicView {
    fn from(music: MusicRecord) -> Self {
        Self {
            id: music.id.as_ref().map(thing_id).unwrap_or_default(),
            title: music.title,
            genre: music.genre,
            price: music.price,
            description: music.description,
            cover_url: music.cover_url,
            audio_url: music.audio_url,
            artist_id: thing_id(&music.artist),
            artist_name: None,
            streams: music.streams,
            created_at: music.created_at,
            is_bought: None,
            playback: None,
        }
    }
}

/// A file part of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw parts of an upload form, before validation.
#[derive(Debug, Default, Clone)]
pub struct MusicUploadForm {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub cover: Option<UploadedFile>,
    pub audio: Option<UploadedFile>,
}

#[derive(Debug, Deserialize, Default)]
pub struct MusicListQuery {
    pub artist: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ArtistDashboard {
    pub total_tracks: u64,
    pub total_sales: u64,
    pub total_streams: u64,
}
