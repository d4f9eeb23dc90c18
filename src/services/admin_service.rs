use surrealdb::{engine::any::Any, Surreal};

use crate::{
    error::{Error, Result},
    helpers::{
        music_helpers::get_music,
        thing_helpers::{create_music_thing, create_user_thing},
        user_helpers::get_user,
    },
    models::{
        admin::AdminStats,
        music::{MusicView, MusicWithArtist},
        user::{Role, UserRecord, UserView},
    },
};

pub struct AdminService;

impl AdminService {
    pub async fn list_users(db: &Surreal<Any>) -> Result<Vec<UserView>> {
        let mut response = db
            .query("SELECT * FROM user ORDER BY created_at DESC;")
            .await?;
        let users: Vec<UserRecord> = response.take(0)?;

        Ok(users.into_iter().map(UserView::from).collect())
    }

    pub async fn delete_user(db: &Surreal<Any>, user_id: &str) -> Result<()> {
        get_user(db, user_id).await?;

        db.query("DELETE $user;")
            .bind(("user", create_user_thing(user_id)))
            .await?
            .check()?;

        tracing::info!("user {} deleted", user_id);
        Ok(())
    }

    /// The new role applies to tokens issued from now on.
    pub async fn change_role(db: &Surreal<Any>, user_id: &str, role: Role) -> Result<UserView> {
        get_user(db, user_id).await?;

        let mut response = db
            .query("UPDATE $user SET role = $role, role_set = true, updated_at = time::now() RETURN AFTER;")
            .bind(("user", create_user_thing(user_id)))
            .bind(("role", role))
            .await?;
        let user: Option<UserRecord> = response.take(0)?;
        let user = user.ok_or_else(|| Error::UserNotFound {
            id: user_id.to_string(),
        })?;

        tracing::info!("user {} is now {}", user_id, role);
        Ok(UserView::from(user))
    }

    pub async fn list_musics(db: &Surreal<Any>) -> Result<Vec<MusicView>> {
        let mut response = db
            .query("SELECT *, artist.name AS artist_name FROM music ORDER BY created_at DESC;")
            .await?;
        let musics: Vec<MusicWithArtist> = response.take(0)?;

        Ok(musics.into_iter().map(MusicView::from).collect())
    }

    /// Removes the track and its reviews. Libraries keep the dangling link.
    pub async fn delete_music(db: &Surreal<Any>, music_id: &str) -> Result<()> {
        get_music(db, music_id).await?;

        db.query("DELETE review WHERE music = $music; DELETE $music;")
            .bind(("music", create_music_thing(music_id)))
            .await?
            .check()?;

        tracing::info!("music {} deleted", music_id);
        Ok(())
    }

    pub async fn stats(db: &Surreal<Any>) -> Result<AdminStats> {
        let mut response = db
            .query(
                r#"
                RETURN {
                    user_count: count((SELECT id FROM user)),
                    music_count: count((SELECT id FROM music)),
                    review_count: count((SELECT id FROM review)),
                    video_count: count((SELECT id FROM video)),
                    pending_video_count: count((SELECT id FROM video WHERE is_validated = false)),
                };
                "#,
            )
            .await?;
        let stats: Option<AdminStats> = response.take(0)?;

        stats.ok_or(Error::DbError("Could not compute stats".into()))
    }
}
