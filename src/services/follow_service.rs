use surrealdb::{engine::any::Any, sql::Thing, Surreal};

use crate::{
    error::{Error, Result},
    events::{ServerEvent, ServerSentEvents},
    helpers::{
        thing_helpers::{create_user_thing, parse_id_part},
        user_helpers::get_artist,
    },
    models::user::FollowToggle,
};

pub struct FollowService;

impl FollowService {
    /// Follows the artist, or unfollows when already following, then pushes
    /// the new follower count to every connected client.
    pub async fn toggle_follow(
        db: &Surreal<Any>,
        events: &ServerSentEvents,
        user_id: &str,
        artist_id: &str,
    ) -> Result<FollowToggle> {
        let artist_id = parse_id_part(artist_id);
        get_artist(db, artist_id).await?;
        if parse_id_part(user_id) == artist_id {
            return Err(Error::SelfFollow);
        }

        let user_thing = create_user_thing(user_id);

        // Single statement so two concurrent toggles cannot both read the old list.
        let mut response = db
            .query(
                r#"
                UPDATE $artist SET followers = IF followers CONTAINS $user {
                    array::complement(followers, [$user])
                } ELSE {
                    array::append(followers, $user)
                } RETURN VALUE followers;
                "#,
            )
            .bind(("artist", create_user_thing(artist_id)))
            .bind(("user", user_thing.clone()))
            .await?;
        let followers: Option<Vec<Thing>> = response.take(0)?;
        let followers = followers.ok_or_else(|| Error::ArtistNotFound {
            id: artist_id.to_string(),
        })?;

        let toggle = FollowToggle {
            following: followers.contains(&user_thing),
            followers: followers.len(),
        };

        events.broadcast(ServerEvent::ArtistFollow {
            artist_id: artist_id.to_string(),
            followers: toggle.followers,
        });

        Ok(toggle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::test_support::{seed_user, setup_db};
    use futures_util::{FutureExt, StreamExt};

    #[tokio::test]
    async fn test_follow_twice_restores_count() {
        let db = setup_db().await;
        let events = ServerSentEvents::new();
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        let fan = seed_user(&db, "Fan", "fan@test.sn", Role::Fan).await;
        let other = seed_user(&db, "Autre", "other@test.sn", Role::Fan).await;

        FollowService::toggle_follow(&db, &events, &other, &artist)
            .await
            .unwrap();

        let followed = FollowService::toggle_follow(&db, &events, &fan, &artist)
            .await
            .unwrap();
        assert_eq!(
            followed,
            FollowToggle {
                following: true,
                followers: 2
            }
        );

        let unfollowed = FollowService::toggle_follow(&db, &events, &fan, &artist)
            .await
            .unwrap();
        assert_eq!(
            unfollowed,
            FollowToggle {
                following: false,
                followers: 1
            }
        );
    }

    #[tokio::test]
    async fn test_follow_broadcasts_count() {
        let db = setup_db().await;
        let events = ServerSentEvents::new();
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        let fan = seed_user(&db, "Fan", "fan@test.sn", Role::Fan).await;
        let mut listener = events.connect();

        FollowService::toggle_follow(&db, &events, &fan, &artist)
            .await
            .unwrap();

        assert!(listener.next().await.is_some());
        assert!(listener.next().now_or_never().is_none());
    }

    #[tokio::test]
    async fn test_follow_refusals() {
        let db = setup_db().await;
        let events = ServerSentEvents::new();
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;
        let fan = seed_user(&db, "Fan", "fan@test.sn", Role::Fan).await;
        let other_fan = seed_user(&db, "Autre", "other@test.sn", Role::Fan).await;

        assert!(matches!(
            FollowService::toggle_follow(&db, &events, &artist, &artist).await,
            Err(Error::SelfFollow)
        ));
        assert!(matches!(
            FollowService::toggle_follow(&db, &events, &fan, &other_fan).await,
            Err(Error::ArtistNotFound { .. })
        ));
        assert!(matches!(
            FollowService::toggle_follow(&db, &events, &fan, "missing").await,
            Err(Error::ArtistNotFound { .. })
        ));
        // A fan targeting themselves is not following an artist at all.
        assert!(matches!(
            FollowService::toggle_follow(&db, &events, &fan, &fan).await,
            Err(Error::ArtistNotFound { .. })
        ));
    }
}
