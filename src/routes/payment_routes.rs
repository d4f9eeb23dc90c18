use axum::{
    routing::{get, post},
    Router,
};

use crate::{controllers::payment_controller::PaymentController, AppState};

use super::authenticated;

pub struct PaymentRoutes;

impl PaymentRoutes {
    pub fn routes(app_state: &AppState) -> Router<AppState> {
        let router = Router::new()
            .route("/paydunya", post(PaymentController::checkout_handler))
            .route(
                "/paydunya/confirm/{token}",
                get(PaymentController::confirm_handler),
            );

        authenticated(router, app_state)
    }
}
