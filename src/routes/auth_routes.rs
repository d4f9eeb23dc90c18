use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::{controllers::auth_controller::AuthController, AppState};

use super::{authenticated, public};

pub struct AuthRoutes;

impl AuthRoutes {
    pub fn routes(app_state: &AppState) -> Router<AppState> {
        let open = Router::new()
            .route("/register", post(AuthController::register_handler))
            .route("/login", post(AuthController::login_handler))
            .route("/forgot-password", post(AuthController::forgot_password_handler))
            .route(
                "/reset-password/{token}",
                post(AuthController::reset_password_handler),
            )
            .route("/google", get(AuthController::google_redirect_handler))
            .route(
                "/google/callback",
                get(AuthController::google_callback_handler),
            );

        let signed_in = Router::new()
            .route(
                "/me",
                get(AuthController::me_handler).patch(AuthController::update_me_handler),
            )
            .route("/password", patch(AuthController::change_password_handler))
            .route("/social-role", patch(AuthController::social_role_handler))
            .route("/library", get(AuthController::library_handler));

        public(open, app_state).merge(authenticated(signed_in, app_state))
    }
}
