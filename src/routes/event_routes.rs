use axum::{routing::get, Router};

use crate::{controllers::event_controller::EventController, AppState};

use super::public;

pub struct EventRoutes;

impl EventRoutes {
    pub fn routes(app_state: &AppState) -> Router<AppState> {
        public(Router::new().route("/", get(EventController::subscribe)), app_state)
    }
}
