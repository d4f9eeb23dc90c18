use axum::{
    routing::{delete, get, patch},
    Router,
};

use crate::{controllers::admin_controller::AdminController, AppState};

use super::admin_only;

pub struct AdminRoutes;

impl AdminRoutes {
    pub fn routes(app_state: &AppState) -> Router<AppState> {
        let router = Router::new()
            .route("/users", get(AdminController::list_users))
            .route("/users/{id}", delete(AdminController::delete_user))
            .route("/users/{id}/role", patch(AdminController::change_role))
            .route("/musics", get(AdminController::list_musics))
            .route("/musics/{id}", delete(AdminController::delete_music))
            .route("/stats", get(AdminController::stats));

        admin_only(router, app_state)
    }
}
