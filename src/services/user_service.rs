use surrealdb::{engine::any::Any, Surreal};

use crate::{
    helpers::{
        thing_helpers::create_user_thing,
        user_helpers::{get_artist, get_user},
    },
    models::{
        database_helpers::CountResult,
        user::{FollowersView, PublicProfile, Role, UserSummary, UserSummaryRecord},
    },
    Result,
};

pub struct UserService;

impl UserService {
    /// Public profile; artists also show how many tracks they published.
    pub async fn get_public_profile(db: &Surreal<Any>, user_id: &str) -> Result<PublicProfile> {
        let user = get_user(db, user_id).await?;

        let music_count = if user.role == Role::Artist {
            let mut response = db
                .query("SELECT count() AS total FROM music WHERE artist = $artist GROUP ALL;")
                .bind(("artist", create_user_thing(user_id)))
                .await?;
            let count: Option<CountResult> = response.take(0)?;
            count.map(|c| c.total).unwrap_or(0)
        } else {
            0
        };

        Ok(PublicProfile::new(user, music_count))
    }

    pub async fn get_followers(db: &Surreal<Any>, artist_id: &str) -> Result<FollowersView> {
        let artist = get_artist(db, artist_id).await?;
        if artist.followers.is_empty() {
            return Ok(FollowersView {
                followers: 0,
                users: vec![],
            });
        }

        let mut response = db
            .query("SELECT id, name, avatar, role FROM $followers;")
            .bind(("followers", artist.followers.clone()))
            .await?;
        let users: Vec<UserSummaryRecord> = response.take(0)?;

        Ok(FollowersView {
            followers: artist.followers.len(),
            users: users.into_iter().map(UserSummary::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ServerSentEvents;
    use crate::services::follow_service::FollowService;
    use crate::test_support::{seed_music, seed_user, setup_db};
    use crate::Error;

    #[tokio::test]
    async fn test_public_profile() {
        let db = setup_db().await;
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        let fan = seed_user(&db, "Fan", "fan@test.sn", Role::Fan).await;
        seed_music(&db, &artist, 2000).await;
        seed_music(&db, &artist, 300).await;

        let profile = UserService::get_public_profile(&db, &artist).await.unwrap();
        assert_eq!(profile.music_count, 2);
        assert_eq!(profile.name, "Artiste");
        assert_eq!(profile.role, Role::Artist);

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["music_count"], 2);
        for private in ["password", "email", "library", "referral_code", "points", "role_set"] {
            assert!(json.get(private).is_none(), "{private} leaked in public profile");
        }

        let fan_profile = UserService::get_public_profile(&db, &fan).await.unwrap();
        assert_eq!(fan_profile.music_count, 0);

        assert!(matches!(
            UserService::get_public_profile(&db, "missing").await,
            Err(Error::UserNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_followers() {
        let db = setup_db().await;
        let events = ServerSentEvents::new();
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        let fan = seed_user(&db, "Fan", "fan@test.sn", Role::Fan).await;

        assert_eq!(UserService::get_followers(&db, &artist).await.unwrap().followers, 0);

        FollowService::toggle_follow(&db, &events, &fan, &artist)
            .await
            .unwrap();
        let followers = UserService::get_followers(&db, &artist).await.unwrap();
        assert_eq!(followers.followers, 1);
        assert_eq!(followers.users[0].name, "Fan");

        assert!(matches!(
            UserService::get_followers(&db, &fan).await,
            Err(Error::ArtistNotFound { .. })
        ));
    }
}
