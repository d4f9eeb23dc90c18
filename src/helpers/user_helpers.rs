use surrealdb::{engine::any::Any, Surreal};

use crate::{
    helpers::thing_helpers::create_user_thing,
    models::user::{Role, UserRecord},
    Error, Result,
};

pub async fn find_user(db: &Surreal<Any>, user_id: &str) -> Result<Option<UserRecord>> {
    let user_thing = create_user_thing(user_id);
    let mut response = db
        .query("SELECT * FROM $user_id;")
        .bind(("user_id", user_thing))
        .await?;
    let user: Option<UserRecord> = response.take(0)?;
    Ok(user)
}

pub async fn get_user(db: &Surreal<Any>, user_id: &str) -> Result<UserRecord> {
    find_user(db, user_id).await?.ok_or_else(|| Error::UserNotFound {
        id: user_id.to_string(),
    })
}

/// Loads a user that must hold the artist role.
pub async fn get_artist(db: &Surreal<Any>, artist_id: &str) -> Result<UserRecord> {
    match find_user(db, artist_id).await? {
        Some(user) if user.role == Role::Artist => Ok(user),
        _ => Err(Error::ArtistNotFound {
            id: artist_id.to_string(),
        }),
    }
}

pub async fn find_user_by_email(db: &Surreal<Any>, email: &str) -> Result<Option<UserRecord>> {
    let mut response = db
        .query("SELECT * FROM user WHERE email = $email LIMIT 1;")
        .bind(("email", email.to_string()))
        .await?;
    let user: Option<UserRecord> = response.take(0)?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_user, setup_db};

    #[tokio::test]
    async fn test_get_user_and_artist() {
        let db = setup_db().await;
        let fan = seed_user(&db, "Fan", "fan@test.sn", Role::Fan).await;
        let artist = seed_user(&db, "Artiste", "artist@test.sn", Role::Artist).await;

        assert_eq!(get_user(&db, &fan).await.unwrap().name, "Fan");
        assert!(matches!(
            get_user(&db, "this_id_does_not_exist").await,
            Err(Error::UserNotFound { .. })
        ));

        assert!(get_artist(&db, &artist).await.is_ok());
        assert!(matches!(
            get_artist(&db, &fan).await,
            Err(Error::ArtistNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let db = setup_db().await;
        seed_user(&db, "Fan", "fan@test.sn", Role::Fan).await;

        assert!(find_user_by_email(&db, "fan@test.sn").await.unwrap().is_some());
        assert!(find_user_by_email(&db, "nobody@test.sn")
            .await
            .unwrap()
            .is_none());
    }
}
