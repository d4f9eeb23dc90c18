//! Who may hear what: purchases, reviews and the playback window.

use serde::Serialize;
use surrealdb::{engine::any::Any, sql::Thing, Surreal};

use crate::{
    error::{Error, Result},
    helpers::{
        music_helpers::get_music,
        thing_helpers::{create_music_thing, create_user_thing},
        user_helpers::get_user,
    },
    middlewares::mw_auth::Ctx,
    models::{
        database_helpers::{violates_index, RecordId},
        music::{MusicView, MusicWithArtist},
        review::{ReviewPayload, ReviewRecord, ReviewView},
        user::Role,
    },
};

/// Seconds a listener who does not own a track may play.
pub const PREVIEW_CAP_SECS: u32 = 30;

/// How much of a track the client may play. Advisory: the media URL itself
/// is not protected.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PlaybackWindow {
    pub unlimited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_seconds: Option<u32>,
    pub seek_beyond_cap: bool,
}

impl PlaybackWindow {
    pub fn full() -> Self {
        Self {
            unlimited: true,
            max_seconds: None,
            seek_beyond_cap: true,
        }
    }

    pub fn preview() -> Self {
        Self {
            unlimited: false,
            max_seconds: Some(PREVIEW_CAP_SECS),
            seek_beyond_cap: false,
        }
    }
}

/// Admins and owners get the whole track, everyone else the preview.
pub fn resolve_playback_window(ctx: Option<&Ctx>, library: &[Thing], music: &Thing) -> PlaybackWindow {
    match ctx {
        Some(ctx) if ctx.role == Role::Admin => PlaybackWindow::full(),
        Some(_) if library.contains(music) => PlaybackWindow::full(),
        _ => PlaybackWindow::preview(),
    }
}

pub struct EntitlementService;

impl EntitlementService {
    pub async fn purchase(db: &Surreal<Any>, user_id: &str, music_id: &str) -> Result<()> {
        let music = get_music(db, music_id).await?;
        let user_thing = create_user_thing(user_id);
        if music.artist == user_thing {
            return Err(Error::OwnMusicPurchase);
        }

        let user = get_user(db, user_id).await?;
        let music_thing = music.id.unwrap_or_else(|| create_music_thing(music_id));
        if user.owns(&music_thing) {
            return Err(Error::AlreadyOwned {
                music_id: music_id.to_string(),
            });
        }

        // A concurrent purchase may have won between the read and the update.
        if !Self::grant(db, &user_thing, &music_thing).await? {
            return Err(Error::AlreadyOwned {
                music_id: music_id.to_string(),
            });
        }

        tracing::info!("user {} bought music {}", user_id, music_id);
        Ok(())
    }

    /// Adds `music` to the library unless it is already there. Returns
    /// whether the library changed.
    pub(crate) async fn grant(db: &Surreal<Any>, user: &Thing, music: &Thing) -> Result<bool> {
        let mut response = db
            .query("UPDATE $user SET library += $music, updated_at = time::now() WHERE library CONTAINSNOT $music RETURN id;")
            .bind(("user", user.clone()))
            .bind(("music", music.clone()))
            .await?;
        let updated: Vec<RecordId> = response.take(0)?;
        Ok(!updated.is_empty())
    }

    pub async fn review(
        db: &Surreal<Any>,
        user_id: &str,
        music_id: &str,
        payload: ReviewPayload,
    ) -> Result<ReviewView> {
        let music = get_music(db, music_id).await?;
        let music_thing = music.id.unwrap_or_else(|| create_music_thing(music_id));

        let user = get_user(db, user_id).await?;
        if !user.owns(&music_thing) {
            return Err(Error::PurchaseRequired);
        }

        let note = payload.note.filter(|note| (1..=5).contains(note));
        let comment = payload
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let (Some(note), Some(comment)) = (note, comment) else {
            return Err(Error::InvalidInput {
                reason: "Note et commentaire obligatoires.".to_string(),
            });
        };

        let user_thing = create_user_thing(user_id);
        let mut response = db
            .query("SELECT id FROM review WHERE music = $music AND user = $user LIMIT 1;")
            .bind(("music", music_thing.clone()))
            .bind(("user", user_thing.clone()))
            .await?;
        let existing: Option<RecordId> = response.take(0)?;
        if existing.is_some() {
            return Err(Error::ReviewAlreadyExists);
        }

        let review = ReviewRecord {
            id: None,
            music: music_thing,
            user: user_thing,
            note,
            comment,
            date: chrono::Utc::now().into(),
        };

        // The unique index still catches a duplicate racing past the check above.
        let created: Option<ReviewRecord> = db
            .create("review")
            .content(review)
            .await
            .map_err(|e| {
                if violates_index(&e, "review_music_user") {
                    Error::ReviewAlreadyExists
                } else {
                    Error::from(e)
                }
            })?;
        let created = created.ok_or(Error::DbError("Could not create review".into()))?;

        Ok(ReviewView::from(created))
    }

    pub async fn playback(
        db: &Surreal<Any>,
        ctx: Option<&Ctx>,
        music_id: &str,
    ) -> Result<PlaybackWindow> {
        let music = get_music(db, music_id).await?;
        let music_thing = music.id.unwrap_or_else(|| create_music_thing(music_id));

        let library = match ctx {
            Some(ctx) if ctx.role != Role::Admin => get_user(db, &ctx.user_id).await?.library,
            _ => vec![],
        };

        Ok(resolve_playback_window(ctx, &library, &music_thing))
    }

    /// Purchased music of the user, newest first, with artist names.
    pub async fn library(db: &Surreal<Any>, user_id: &str) -> Result<Vec<MusicView>> {
        let user = get_user(db, user_id).await?;
        if user.library.is_empty() {
            return Ok(vec![]);
        }

        let mut response = db
            .query("SELECT *, artist.name AS artist_name FROM music WHERE id INSIDE $library ORDER BY created_at DESC;")
            .bind(("library", user.library))
            .await?;
        let musics: Vec<MusicWithArtist> = response.take(0)?;

        Ok(musics
            .into_iter()
            .map(|music| {
                let mut view = MusicView::from(music);
                view.is_bought = Some(true);
                view.playback = Some(PlaybackWindow::full());
                view
            })
            .collect())
    }

    /// Counts one play. Returns the new stream count.
    pub async fn listen(db: &Surreal<Any>, music_id: &str) -> Result<u64> {
        let music = get_music(db, music_id).await?;
        let music_thing = music.id.unwrap_or_else(|| create_music_thing(music_id));

        let mut response = db
            .query("UPDATE $music SET streams += 1 RETURN VALUE streams;")
            .bind(("music", music_thing))
            .await?;
        let streams: Option<u64> = response.take(0)?;

        streams.ok_or_else(|| Error::MusicNotFound {
            id: music_id.to_string(),
        })
    }
}
