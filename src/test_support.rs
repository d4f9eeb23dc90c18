//! Fixtures shared by the in-memory database tests.

use std::sync::Arc;

use surrealdb::{
    engine::any::{connect, Any},
    Surreal,
};

use crate::{
    auth::{password_service, token_service::test_config},
    events::ServerSentEvents,
    helpers::thing_helpers::{create_user_thing, thing_id},
    middlewares::{mw_auth::Ctx, mw_rate_limit::new_rate_limit_cache},
    models::{
        database_helpers::define_indexes,
        music::MusicRecord,
        user::{Role, UserRecord},
        video::VideoRecord,
    },
    services::mail_service::LogMailer,
    AppState,
};

pub async fn setup_db() -> Surreal<Any> {
    let db = connect("mem://").await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    define_indexes(&db).await.unwrap();
    db
}

/// State with no external provider configured.
pub fn app_state(db: Surreal<Any>) -> AppState {
    AppState {
        db,
        auth_config: test_config(),
        rate_limit_cache: new_rate_limit_cache(),
        oauth_states: moka::future::Cache::new(100),
        events: ServerSentEvents::new(),
        invoices: None,
        media: None,
        identity: None,
        mailer: Arc::new(LogMailer),
        frontend_url: "http://localhost:5173".to_string(),
    }
}

pub fn ctx(user_id: &str, role: Role) -> Ctx {
    Ctx::new(user_id.to_string(), role, 0)
}

pub async fn seed_user(db: &Surreal<Any>, name: &str, email: &str, role: Role) -> String {
    let now = chrono::Utc::now();
    let user = UserRecord {
        id: None,
        name: name.to_string(),
        email: email.to_string(),
        password: password_service::hash_password("secret123").unwrap(),
        role,
        role_set: true,
        library: vec![],
        followers: vec![],
        avatar: None,
        google_id: None,
        referral_code: format!("REF-{email}"),
        referred_by: None,
        points: 0,
        reset_password_token: None,
        reset_password_expires: None,
        created_at: now.into(),
        updated_at: now.into(),
    };

    let created: UserRecord = db
        .create("user")
        .content(user)
        .await
        .unwrap()
        .expect("Test user creation returned nothing (None).");

    thing_id(&created.id.unwrap())
}

pub async fn seed_music(db: &Surreal<Any>, artist_id: &str, price: u32) -> String {
    let music = MusicRecord {
        id: None,
        title: "Titre".to_string(),
        genre: "Rap".to_string(),
        price,
        description: "Un son de rue".to_string(),
        cover_url: "https://example.com/cover.jpg".to_string(),
        audio_url: "https://example.com/audio.mp3".to_string(),
        artist: create_user_thing(artist_id),
        streams: 0,
        created_at: chrono::Utc::now().into(),
    };

    let created: MusicRecord = db
        .create("music")
        .content(music)
        .await
        .unwrap()
        .expect("Test music creation returned nothing (None).");

    thing_id(&created.id.unwrap())
}

pub async fn seed_video(db: &Surreal<Any>, artist_id: &str, title: &str, validated: bool) -> String {
    let video = VideoRecord {
        id: None,
        title: title.to_string(),
        description: None,
        url: format!("https://example.com/{title}.mp4"),
        artist: create_user_thing(artist_id),
        is_validated: validated,
        likes: vec![],
        comments: vec![],
        created_at: chrono::Utc::now().into(),
    };

    let created: VideoRecord = db
        .create("video")
        .content(video)
        .await
        .unwrap()
        .expect("Test video creation returned nothing (None).");

    thing_id(&created.id.unwrap())
}
