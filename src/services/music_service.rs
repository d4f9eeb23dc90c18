use surrealdb::{engine::any::Any, Surreal};

use crate::{
    error::{Error, Result},
    helpers::{
        music_helpers::get_music,
        thing_helpers::{create_music_thing, create_user_thing},
        user_helpers::find_user,
    },
    middlewares::mw_auth::Ctx,
    models::{
        music::{
            ArtistDashboard, MusicListQuery, MusicRecord, MusicUploadForm, MusicView,
            MusicWithArtist, UploadedFile, MIN_MUSIC_PRICE,
        },
        review::{ReviewView, ReviewWithUser},
    },
    services::{
        cloudinary_service::{MediaStore, MediaUpload, ResourceType, AUDIOS_FOLDER, COVERS_FOLDER},
        entitlement_service::resolve_playback_window,
    },
};

pub struct MusicService;

impl MusicService {
    pub async fn upload(
        db: &Surreal<Any>,
        media: &dyn MediaStore,
        artist_id: &str,
        form: MusicUploadForm,
    ) -> Result<MusicView> {
        let required = |field: Option<String>| {
            field
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let (Some(title), Some(genre), Some(price), Some(description), Some(cover), Some(audio)) = (
            required(form.title),
            required(form.genre),
            required(form.price),
            required(form.description),
            form.cover.filter(|file| !file.bytes.is_empty()),
            form.audio.filter(|file| !file.bytes.is_empty()),
        ) else {
            return Err(Error::MissingFields);
        };

        let price = parse_price(&price)?;

        let cover_url = media
            .upload(media_upload(COVERS_FOLDER, ResourceType::Image, cover))
            .await?;
        let audio_url = media
            .upload(media_upload(AUDIOS_FOLDER, ResourceType::Video, audio))
            .await?;

        let music = MusicRecord {
            id: None,
            title,
            genre,
            price,
            description,
            cover_url,
            audio_url,
            artist: create_user_thing(artist_id),
            streams: 0,
            created_at: chrono::Utc::now().into(),
        };

        let created: Option<MusicRecord> = db.create("music").content(music).await?;
        let created = created.ok_or(Error::DbError("Could not create music".into()))?;

        tracing::info!("artist {} uploaded \"{}\"", artist_id, created.title);
        Ok(MusicView::from(created))
    }

    /// Newest first. With a caller, every item says whether it is owned and
    /// how much of it may be played.
    pub async fn list(
        db: &Surreal<Any>,
        ctx: Option<&Ctx>,
        query: MusicListQuery,
    ) -> Result<Vec<MusicView>> {
        let mut response = match query.artist.filter(|a| !a.trim().is_empty()) {
            Some(artist_id) => {
                db.query("SELECT *, artist.name AS artist_name FROM music WHERE artist = $artist ORDER BY created_at DESC;")
                    .bind(("artist", create_user_thing(&artist_id)))
                    .await?
            }
            None => {
                db.query("SELECT *, artist.name AS artist_name FROM music ORDER BY created_at DESC;")
                    .await?
            }
        };
        let musics: Vec<MusicWithArtist> = response.take(0)?;

        let Some(ctx) = ctx else {
            return Ok(musics.into_iter().map(MusicView::from).collect());
        };

        let library = find_user(db, &ctx.user_id)
            .await?
            .map(|user| user.library)
            .unwrap_or_default();

        Ok(musics
            .into_iter()
            .map(|music| {
                let is_bought = library.contains(&music.id);
                let playback = resolve_playback_window(Some(ctx), &library, &music.id);
                let mut view = MusicView::from(music);
                view.is_bought = Some(is_bought);
                view.playback = Some(playback);
                view
            })
            .collect())
    }

    pub async fn reviews(db: &Surreal<Any>, music_id: &str) -> Result<Vec<ReviewView>> {
        get_music(db, music_id).await?;

        let mut response = db
            .query("SELECT *, user.name AS user_name FROM review WHERE music = $music ORDER BY date DESC;")
            .bind(("music", create_music_thing(music_id)))
            .await?;
        let reviews: Vec<ReviewWithUser> = response.take(0)?;

        Ok(reviews.into_iter().map(ReviewView::from).collect())
    }

    pub async fn artist_dashboard(db: &Surreal<Any>, artist_id: &str) -> Result<ArtistDashboard> {
        let mut response = db
            .query(
                r#"
                LET $tracks = (SELECT VALUE id FROM music WHERE artist = $artist);
                RETURN {
                    total_tracks: array::len($tracks),
                    total_sales: math::sum((SELECT VALUE array::len(array::intersect(library, $tracks)) FROM user)),
                    total_streams: math::sum((SELECT VALUE streams FROM music WHERE artist = $artist)),
                };
                "#,
            )
            .bind(("artist", create_user_thing(artist_id)))
            .await?;
        let dashboard: Option<ArtistDashboard> = response.take(1)?;

        Ok(dashboard.unwrap_or(ArtistDashboard {
            total_tracks: 0,
            total_sales: 0,
            total_streams: 0,
        }))
    }
}

fn parse_price(raw: &str) -> Result<u32> {
    let price: u32 = raw.parse().map_err(|_| Error::InvalidInput {
        reason: "Prix invalide.".to_string(),
    })?;
    if price < MIN_MUSIC_PRICE {
        return Err(Error::InvalidInput {
            reason: format!("Le prix minimum est de {MIN_MUSIC_PRICE} F CFA."),
        });
    }
    Ok(price)
}

fn media_upload(folder: &'static str, resource_type: ResourceType, file: UploadedFile) -> MediaUpload {
    MediaUpload {
        folder,
        resource_type,
        file_name: file.file_name,
        content_type: file.content_type,
        bytes: file.bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{review::ReviewPayload, user::Role};
    use crate::services::{
        cloudinary_service::fake::FakeMediaStore, entitlement_service::EntitlementService,
    };
    use crate::test_support::{ctx, seed_music, seed_user, setup_db};

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: None,
            bytes: vec![1, 2, 3],
        }
    }

    fn form(price: &str) -> MusicUploadForm {
        MusicUploadForm {
            title: Some("Dakar la nuit".to_string()),
            genre: Some("Rap".to_string()),
            price: Some(price.to_string()),
            description: Some("Premier single".to_string()),
            cover: Some(file("cover.jpg")),
            audio: Some(file("audio.mp3")),
        }
    }

    #[tokio::test]
    async fn test_upload_stores_media_and_music() {
        let db = setup_db().await;
        let media = FakeMediaStore::default();
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;

        let music = MusicService::upload(&db, &media, &artist, form("2000"))
            .await
            .unwrap();
        assert_eq!(music.price, 2000);
        assert_eq!(music.artist_id, artist);
        assert!(music.cover_url.contains(COVERS_FOLDER));
        assert!(music.audio_url.contains(AUDIOS_FOLDER));

        let uploads = media.uploads.lock().clone();
        assert_eq!(
            uploads,
            vec![
                (COVERS_FOLDER.to_string(), ResourceType::Image),
                (AUDIOS_FOLDER.to_string(), ResourceType::Video),
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_validation() {
        let db = setup_db().await;
        let media = FakeMediaStore::default();
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;

        let mut without_audio = form("2000");
        without_audio.audio = None;
        assert!(matches!(
            MusicService::upload(&db, &media, &artist, without_audio).await,
            Err(Error::MissingFields)
        ));
        assert!(matches!(
            MusicService::upload(&db, &media, &artist, form("199")).await,
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            MusicService::upload(&db, &media, &artist, form("gratuit")).await,
            Err(Error::InvalidInput { .. })
        ));
        assert!(media.uploads.lock().is_empty());
    }

    #[tokio::test]
    async fn test_upload_media_failure_creates_nothing() {
        let db = setup_db().await;
        let media = FakeMediaStore {
            fail: true,
            ..Default::default()
        };
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;

        let result = MusicService::upload(&db, &media, &artist, form("2000")).await;
        assert!(matches!(result, Err(Error::MediaProvider { .. })));
        assert!(MusicService::list(&db, None, MusicListQuery::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_marks_owned_music() {
        let db = setup_db().await;
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        let other_artist = seed_user(&db, "Autre", "other@test.sn", Role::Artist).await;
        let fan = seed_user(&db, "Fan", "fan@test.sn", Role::Fan).await;
        let owned = seed_music(&db, &artist, 2000).await;
        let not_owned = seed_music(&db, &other_artist, 500).await;
        EntitlementService::purchase(&db, &fan, &owned).await.unwrap();

        let anonymous = MusicService::list(&db, None, MusicListQuery::default())
            .await
            .unwrap();
        assert_eq!(anonymous.len(), 2);
        assert!(anonymous.iter().all(|m| m.is_bought.is_none()));

        let fan_ctx = ctx(&fan, Role::Fan);
        let listed = MusicService::list(&db, Some(&fan_ctx), MusicListQuery::default())
            .await
            .unwrap();
        let owned_view = listed.iter().find(|m| m.id == owned).unwrap();
        let other_view = listed.iter().find(|m| m.id == not_owned).unwrap();
        assert_eq!(owned_view.is_bought, Some(true));
        assert!(owned_view.playback.unwrap().unlimited);
        assert_eq!(other_view.is_bought, Some(false));
        assert!(!other_view.playback.unwrap().unlimited);

        let filtered = MusicService::list(
            &db,
            None,
            MusicListQuery {
                artist: Some(other_artist.clone()),
            },
        )
        .await
        .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].artist_name.as_deref(), Some("Autre"));
    }

    #[tokio::test]
    async fn test_reviews_and_dashboard() {
        let db = setup_db().await;
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        let fan = seed_user(&db, "Fan", "fan@test.sn", Role::Fan).await;
        let other_fan = seed_user(&db, "Autre fan", "fan2@test.sn", Role::Fan).await;
        let first = seed_music(&db, &artist, 2000).await;
        let second = seed_music(&db, &artist, 1000).await;

        EntitlementService::purchase(&db, &fan, &first).await.unwrap();
        EntitlementService::purchase(&db, &fan, &second).await.unwrap();
        EntitlementService::purchase(&db, &other_fan, &first).await.unwrap();
        EntitlementService::listen(&db, &first).await.unwrap();

        EntitlementService::review(
            &db,
            &fan,
            &first,
            ReviewPayload {
                note: Some(5),
                comment: Some("Classique".to_string()),
            },
        )
        .await
        .unwrap();

        let reviews = MusicService::reviews(&db, &first).await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].user_name.as_deref(), Some("Fan"));
        assert!(matches!(
            MusicService::reviews(&db, "missing").await,
            Err(Error::MusicNotFound { .. })
        ));

        let dashboard = MusicService::artist_dashboard(&db, &artist).await.unwrap();
        assert_eq!(
            dashboard,
            ArtistDashboard {
                total_tracks: 2,
                total_sales: 3,
                total_streams: 1,
            }
        );

        let empty = MusicService::artist_dashboard(&db, &fan).await.unwrap();
        assert_eq!(empty.total_tracks, 0);
        assert_eq!(empty.total_sales, 0);
    }
}
