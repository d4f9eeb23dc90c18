use axum::{
    routing::{get, post},
    Router,
};

use crate::{controllers::music_controller::MusicController, AppState};

use super::{artist_only, authenticated, optional_auth, public};

pub struct MusicRoutes;

impl MusicRoutes {
    pub fn routes(app_state: &AppState) -> Router<AppState> {
        let catalog = Router::new()
            .route("/", get(MusicController::list_handler))
            .route("/{id}/reviews", get(MusicController::reviews_handler))
            .route("/{id}/playback", get(MusicController::playback_handler));

        let streams = Router::new().route("/{id}/listen", post(MusicController::listen_handler));

        let buyers = Router::new()
            .route("/buy/{id}", post(MusicController::buy_handler))
            .route("/{id}/review", post(MusicController::review_handler));

        let artists = Router::new()
            .route("/upload", post(MusicController::upload_handler))
            .route(
                "/artist-dashboard",
                get(MusicController::artist_dashboard_handler),
            );

        optional_auth(catalog, app_state)
            .merge(public(streams, app_state))
            .merge(authenticated(buyers, app_state))
            .merge(artist_only(artists, app_state))
    }
}
