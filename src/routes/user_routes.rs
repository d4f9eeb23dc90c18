use axum::{
    routing::{get, post},
    Router,
};

use crate::{controllers::user_controller::UserController, AppState};

use super::{authenticated, public};

pub struct UserRoutes;

impl UserRoutes {
    pub fn routes(app_state: &AppState) -> Router<AppState> {
        let profiles = Router::new()
            .route("/{user_id}", get(UserController::get_user_profile))
            .route("/{user_id}/followers", get(UserController::get_followers));

        let follows =
            Router::new().route("/{user_id}/follow", post(UserController::toggle_follow));

        public(profiles, app_state).merge(authenticated(follows, app_state))
    }
}
