//! Artist videos and the moderation gate in front of the public feed.

use std::collections::HashMap;

use surrealdb::{engine::any::Any, sql::Thing, Surreal};

use crate::{
    auth::capability::authorize_owner_or_admin,
    error::{Error, Result},
    events::{ServerEvent, ServerSentEvents},
    helpers::thing_helpers::{create_user_thing, create_video_thing, parse_id_part, thing_id},
    middlewares::mw_auth::Ctx,
    models::{
        pagination::PaginationQuery,
        user::{Role, UserSummaryRecord},
        video::{
            CommentView, CreateVideoPayload, LikeToggle, UpdateVideoPayload, VideoComment,
            VideoRecord, VideoStats, VideoView, VideoWithArtist,
        },
    },
};

const VIDEO_WITH_ARTIST: &str =
    "SELECT *, artist.name AS artist_name, artist.avatar AS artist_avatar FROM video";

pub struct VideoService;

impl VideoService {
    /// Validated videos only, newest first.
    pub async fn feed(db: &Surreal<Any>, pagination: &PaginationQuery) -> Result<Vec<VideoView>> {
        let mut response = db
            .query(format!(
                "{VIDEO_WITH_ARTIST} WHERE is_validated = true ORDER BY created_at DESC LIMIT $limit START $start;"
            ))
            .bind(("limit", pagination.limit()))
            .bind(("start", pagination.start()))
            .await?;
        let videos: Vec<VideoWithArtist> = response.take(0)?;

        Ok(videos.into_iter().map(VideoView::from).collect())
    }

    pub async fn create(
        db: &Surreal<Any>,
        artist_id: &str,
        payload: CreateVideoPayload,
    ) -> Result<VideoView> {
        let title = payload.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        let url = payload.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        let (Some(title), Some(url)) = (title, url) else {
            return Err(Error::InvalidInput {
                reason: "Titre et URL requis.".to_string(),
            });
        };

        let video = VideoRecord {
            id: None,
            title,
            description: payload.description,
            url,
            artist: create_user_thing(artist_id),
            is_validated: false,
            likes: vec![],
            comments: vec![],
            created_at: chrono::Utc::now().into(),
        };

        let created: Option<VideoRecord> = db.create("video").content(video).await?;
        let created = created.ok_or(Error::DbError("Could not create video".into()))?;

        tracing::info!("video \"{}\" awaiting validation", created.title);
        Ok(VideoView::from(created))
    }

    /// Publishes the video and moves it to the head of the feed.
    pub async fn validate(db: &Surreal<Any>, video_id: &str) -> Result<VideoView> {
        get_video(db, video_id).await?;

        let mut response = db
            .query("UPDATE $video SET is_validated = true, created_at = time::now() RETURN AFTER;")
            .bind(("video", create_video_thing(video_id)))
            .await?;
        let video: Option<VideoRecord> = response.take(0)?;
        let video = video.ok_or_else(|| video_not_found(video_id))?;

        tracing::info!("video {} validated", video_id);
        Ok(VideoView::from(video))
    }

    /// Every video of the artist, validated or not.
    pub async fn my_videos(db: &Surreal<Any>, artist_id: &str) -> Result<Vec<VideoView>> {
        let mut response = db
            .query("SELECT * FROM video WHERE artist = $artist ORDER BY created_at DESC;")
            .bind(("artist", create_user_thing(artist_id)))
            .await?;
        let videos: Vec<VideoRecord> = response.take(0)?;

        Ok(videos.into_iter().map(VideoView::from).collect())
    }

    pub async fn delete(db: &Surreal<Any>, ctx: &Ctx, video_id: &str) -> Result<()> {
        let video = get_video(db, video_id).await?;
        authorize_owner_or_admin(ctx, &thing_id(&video.artist))?;

        db.query("DELETE $video;")
            .bind(("video", create_video_thing(video_id)))
            .await?
            .check()?;

        tracing::info!("video {} deleted by {}", video_id, ctx.user_id);
        Ok(())
    }

    /// Owner only; empty fields are left untouched.
    pub async fn edit(
        db: &Surreal<Any>,
        ctx: &Ctx,
        video_id: &str,
        payload: UpdateVideoPayload,
    ) -> Result<VideoView> {
        let video = get_video(db, video_id).await?;
        if thing_id(&video.artist) != parse_id_part(&ctx.user_id) {
            return Err(Error::AccessDenied {
                reason: "Non autorisé.".to_string(),
            });
        }

        let title = payload
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(video.title);
        let description = payload
            .description
            .filter(|d| !d.trim().is_empty())
            .or(video.description);

        let mut response = db
            .query("UPDATE $video SET title = $title, description = $description RETURN AFTER;")
            .bind(("video", create_video_thing(video_id)))
            .bind(("title", title))
            .bind(("description", description))
            .await?;
        let updated: Option<VideoRecord> = response.take(0)?;

        updated
            .map(VideoView::from)
            .ok_or_else(|| video_not_found(video_id))
    }

    pub async fn toggle_like(
        db: &Surreal<Any>,
        events: &ServerSentEvents,
        ctx: &Ctx,
        video_id: &str,
    ) -> Result<LikeToggle> {
        get_visible_video(db, Some(ctx), video_id).await?;
        let user_thing = create_user_thing(&ctx.user_id);

        let mut response = db
            .query(
                r#"
                UPDATE $video SET likes = IF likes CONTAINS $user {
                    array::complement(likes, [$user])
                } ELSE {
                    array::append(likes, $user)
                } RETURN VALUE likes;
                "#,
            )
            .bind(("video", create_video_thing(video_id)))
            .bind(("user", user_thing.clone()))
            .await?;
        let likes: Option<Vec<Thing>> = response.take(0)?;
        let likes = likes.ok_or_else(|| video_not_found(video_id))?;

        let toggle = LikeToggle {
            liked: likes.contains(&user_thing),
            likes: likes.len(),
        };

        events.broadcast(ServerEvent::VideoLike {
            video_id: parse_id_part(video_id).to_string(),
            likes: toggle.likes,
        });

        Ok(toggle)
    }

    pub async fn comment(
        db: &Surreal<Any>,
        events: &ServerSentEvents,
        ctx: &Ctx,
        video_id: &str,
        text: Option<String>,
    ) -> Result<CommentView> {
        let text = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidInput {
                reason: "Commentaire requis.".to_string(),
            })?;
        get_visible_video(db, Some(ctx), video_id).await?;

        let comment = VideoComment {
            user: create_user_thing(&ctx.user_id),
            text,
            created_at: chrono::Utc::now().into(),
        };

        let mut response = db
            .query("UPDATE $video SET comments += $comment RETURN VALUE comments;")
            .bind(("video", create_video_thing(video_id)))
            .bind(("comment", comment))
            .await?;
        let comments: Option<Vec<VideoComment>> = response.take(0)?;
        let mut comments = comments.ok_or_else(|| video_not_found(video_id))?;

        events.broadcast(ServerEvent::VideoComment {
            video_id: parse_id_part(video_id).to_string(),
            comments: comments.len(),
        });

        let posted = comments.pop().ok_or_else(|| video_not_found(video_id))?;
        Ok(CommentView::from(posted))
    }

    /// Comments in posting order, with their authors' name and avatar.
    pub async fn comments(
        db: &Surreal<Any>,
        ctx: Option<&Ctx>,
        video_id: &str,
    ) -> Result<Vec<CommentView>> {
        let video = get_visible_video(db, ctx, video_id).await?;
        if video.comments.is_empty() {
            return Ok(vec![]);
        }

        let mut authors: Vec<Thing> = Vec::new();
        for comment in &video.comments {
            if !authors.contains(&comment.user) {
                authors.push(comment.user.clone());
            }
        }

        let mut response = db
            .query("SELECT id, name, avatar, role FROM $authors;")
            .bind(("authors", authors))
            .await?;
        let authors: Vec<UserSummaryRecord> = response.take(0)?;
        let authors: HashMap<Thing, UserSummaryRecord> =
            authors.into_iter().map(|a| (a.id.clone(), a)).collect();

        Ok(video
            .comments
            .into_iter()
            .map(|comment| {
                let author = authors.get(&comment.user);
                let user_name = author.map(|a| a.name.clone());
                let user_avatar = author.and_then(|a| a.avatar.clone());
                let mut view = CommentView::from(comment);
                view.user_name = user_name;
                view.user_avatar = user_avatar;
                view
            })
            .collect())
    }

    pub async fn stats(db: &Surreal<Any>, ctx: Option<&Ctx>, video_id: &str) -> Result<VideoStats> {
        let video = get_visible_video(db, ctx, video_id).await?;
        Ok(VideoStats {
            likes: video.likes.len(),
            comments: video.comments.len(),
        })
    }

    /// Admin listing, optionally filtered on the validation flag.
    pub async fn list_all(db: &Surreal<Any>, validated: Option<bool>) -> Result<Vec<VideoView>> {
        let mut response = match validated {
            Some(validated) => {
                db.query(format!(
                    "{VIDEO_WITH_ARTIST} WHERE is_validated = $validated ORDER BY created_at DESC;"
                ))
                .bind(("validated", validated))
                .await?
            }
            None => {
                db.query(format!("{VIDEO_WITH_ARTIST} ORDER BY created_at DESC;"))
                    .await?
            }
        };
        let videos: Vec<VideoWithArtist> = response.take(0)?;

        Ok(videos.into_iter().map(VideoView::from).collect())
    }
}

fn video_not_found(video_id: &str) -> Error {
    Error::VideoNotFound {
        id: video_id.to_string(),
    }
}

async fn get_video(db: &Surreal<Any>, video_id: &str) -> Result<VideoRecord> {
    let mut response = db
        .query("SELECT * FROM $video;")
        .bind(("video", create_video_thing(video_id)))
        .await?;
    let video: Option<VideoRecord> = response.take(0)?;
    video.ok_or_else(|| video_not_found(video_id))
}

/// Unvalidated videos only exist for their artist and for admins.
async fn get_visible_video(
    db: &Surreal<Any>,
    ctx: Option<&Ctx>,
    video_id: &str,
) -> Result<VideoRecord> {
    let video = get_video(db, video_id).await?;
    if video.is_validated {
        return Ok(video);
    }

    match ctx {
        Some(ctx) if ctx.role == Role::Admin => Ok(video),
        Some(ctx) if thing_id(&video.artist) == parse_id_part(&ctx.user_id) => Ok(video),
        _ => Err(video_not_found(video_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, seed_user, seed_video, setup_db};
    use futures_util::StreamExt;

    fn payload(title: Option<&str>, url: Option<&str>) -> CreateVideoPayload {
        CreateVideoPayload {
            title: title.map(str::to_string),
            description: None,
            url: url.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_feed_only_shows_validated_videos() {
        let db = setup_db().await;
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        seed_video(&db, &artist, "visible", true).await;
        seed_video(&db, &artist, "pending", false).await;

        let feed = VideoService::feed(&db, &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].title, "visible");
        assert_eq!(feed[0].artist_name.as_deref(), Some("Artiste"));
    }

    #[tokio::test]
    async fn test_validation_moves_video_to_head_of_feed() {
        let db = setup_db().await;
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        let pending = seed_video(&db, &artist, "pending", false).await;
        seed_video(&db, &artist, "newer", true).await;

        VideoService::validate(&db, &pending).await.unwrap();

        let feed = VideoService::feed(&db, &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].id, pending);
        assert!(feed[0].is_validated);

        assert!(matches!(
            VideoService::validate(&db, "missing").await,
            Err(Error::VideoNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_feed_pagination() {
        let db = setup_db().await;
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        for i in 0..3 {
            seed_video(&db, &artist, &format!("v{i}"), true).await;
        }

        let page = |page, limit| PaginationQuery {
            page: Some(page),
            limit: Some(limit),
        };
        let first = VideoService::feed(&db, &page(1, 2)).await.unwrap();
        let second = VideoService::feed(&db, &page(2, 2)).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(first[0].title, "v2");
        assert_eq!(second[0].title, "v0");
    }

    #[tokio::test]
    async fn test_create_and_my_videos() {
        let db = setup_db().await;
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;

        assert!(matches!(
            VideoService::create(&db, &artist, payload(Some("Clip"), None)).await,
            Err(Error::InvalidInput { .. })
        ));

        let video = VideoService::create(&db, &artist, payload(Some("Clip"), Some("https://v.test/1")))
            .await
            .unwrap();
        assert!(!video.is_validated);

        let mine = VideoService::my_videos(&db, &artist).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(VideoService::feed(&db, &PaginationQuery::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_edit_and_delete_permissions() {
        let db = setup_db().await;
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        let fan = seed_user(&db, "Fan", "fan@test.sn", Role::Fan).await;
        let admin = seed_user(&db, "Admin", "admin@test.sn", Role::Admin).await;
        let video = seed_video(&db, &artist, "clip", true).await;

        let edit = UpdateVideoPayload {
            title: Some("Nouveau titre".to_string()),
            description: None,
        };
        assert!(matches!(
            VideoService::edit(&db, &ctx(&fan, Role::Fan), &video, edit).await,
            Err(Error::AccessDenied { .. })
        ));

        let edited = VideoService::edit(
            &db,
            &ctx(&artist, Role::Artist),
            &video,
            UpdateVideoPayload {
                title: Some("Nouveau titre".to_string()),
                description: Some("Tourné à Pikine".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(edited.title, "Nouveau titre");
        assert_eq!(edited.description.as_deref(), Some("Tourné à Pikine"));

        assert!(matches!(
            VideoService::delete(&db, &ctx(&fan, Role::Fan), &video).await,
            Err(Error::AccessDenied { .. })
        ));
        VideoService::delete(&db, &ctx(&admin, Role::Admin), &video)
            .await
            .unwrap();
        assert!(matches!(
            VideoService::stats(&db, None, &video).await,
            Err(Error::VideoNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_like_toggle_broadcasts() {
        let db = setup_db().await;
        let events = ServerSentEvents::new();
        let mut listener = events.connect();
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        let fan = seed_user(&db, "Fan", "fan@test.sn", Role::Fan).await;
        let video = seed_video(&db, &artist, "clip", true).await;
        let fan_ctx = ctx(&fan, Role::Fan);

        let liked = VideoService::toggle_like(&db, &events, &fan_ctx, &video)
            .await
            .unwrap();
        assert_eq!(liked, LikeToggle { liked: true, likes: 1 });

        let unliked = VideoService::toggle_like(&db, &events, &fan_ctx, &video)
            .await
            .unwrap();
        assert_eq!(unliked, LikeToggle { liked: false, likes: 0 });

        assert!(listener.next().await.is_some());
        assert!(listener.next().await.is_some());
    }

    #[tokio::test]
    async fn test_comments_with_authors() {
        let db = setup_db().await;
        let events = ServerSentEvents::new();
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        let fan = seed_user(&db, "Fan", "fan@test.sn", Role::Fan).await;
        let video = seed_video(&db, &artist, "clip", true).await;
        let fan_ctx = ctx(&fan, Role::Fan);

        assert!(matches!(
            VideoService::comment(&db, &events, &fan_ctx, &video, Some("  ".to_string())).await,
            Err(Error::InvalidInput { .. })
        ));

        let posted = VideoService::comment(&db, &events, &fan_ctx, &video, Some("Validé".to_string()))
            .await
            .unwrap();
        assert_eq!(posted.text, "Validé");
        VideoService::comment(
            &db,
            &events,
            &ctx(&artist, Role::Artist),
            &video,
            Some("Merci".to_string()),
        )
        .await
        .unwrap();

        let comments = VideoService::comments(&db, None, &video).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].user_name.as_deref(), Some("Fan"));
        assert_eq!(comments[1].user_name.as_deref(), Some("Artiste"));

        let stats = VideoService::stats(&db, None, &video).await.unwrap();
        assert_eq!(stats, VideoStats { likes: 0, comments: 2 });
    }

    #[tokio::test]
    async fn test_unvalidated_video_hidden_from_fans() {
        let db = setup_db().await;
        let events = ServerSentEvents::new();
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        let fan = seed_user(&db, "Fan", "fan@test.sn", Role::Fan).await;
        let video = seed_video(&db, &artist, "pending", false).await;

        assert!(matches!(
            VideoService::stats(&db, None, &video).await,
            Err(Error::VideoNotFound { .. })
        ));
        assert!(matches!(
            VideoService::toggle_like(&db, &events, &ctx(&fan, Role::Fan), &video).await,
            Err(Error::VideoNotFound { .. })
        ));
        assert!(VideoService::stats(&db, Some(&ctx(&artist, Role::Artist)), &video)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_admin_listing_filter() {
        let db = setup_db().await;
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        seed_video(&db, &artist, "visible", true).await;
        seed_video(&db, &artist, "pending", false).await;

        assert_eq!(VideoService::list_all(&db, None).await.unwrap().len(), 2);
        let pending = VideoService::list_all(&db, Some(false)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "pending");
        assert_eq!(VideoService::list_all(&db, Some(true)).await.unwrap().len(), 1);
    }
}
