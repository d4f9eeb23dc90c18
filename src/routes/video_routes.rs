use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::{controllers::video_controller::VideoController, AppState};

use super::{admin_only, artist_only, authenticated, optional_auth, public};

pub struct VideoRoutes;

impl VideoRoutes {
    pub fn routes(app_state: &AppState) -> Router<AppState> {
        let feed = Router::new().route("/", get(VideoController::feed_handler));

        let details = Router::new()
            .route("/{id}/comments", get(VideoController::comments_handler))
            .route("/{id}/stats", get(VideoController::stats_handler));

        let members = Router::new()
            .route("/my", get(VideoController::my_videos_handler))
            .route(
                "/{id}",
                patch(VideoController::edit_handler).delete(VideoController::delete_handler),
            )
            .route("/{id}/like", post(VideoController::like_handler))
            .route("/{id}/comment", post(VideoController::comment_handler));

        let artists = Router::new().route("/", post(VideoController::create_handler));

        let admins = Router::new()
            .route("/{id}/validate", patch(VideoController::validate_handler))
            .route("/all", get(VideoController::list_all_handler));

        public(feed, app_state)
            .merge(optional_auth(details, app_state))
            .merge(authenticated(members, app_state))
            .merge(artist_only(artists, app_state))
            .merge(admin_only(admins, app_state))
    }
}
