use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::{
    middlewares::mw_auth::Ctx,
    models::order::{CheckoutPayload, CheckoutResponse, ConfirmationResponse},
    services::payment_service::PaymentService,
    AppState, Result,
};

pub struct PaymentController;

impl PaymentController {
    pub async fn checkout_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Json(payload): Json<CheckoutPayload>,
    ) -> Result<Json<CheckoutResponse>> {
        let response =
            PaymentService::checkout(&state.db, state.invoices()?, &ctx.user_id, payload).await?;
        Ok(Json(response))
    }

    pub async fn confirm_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Path(token): Path<String>,
    ) -> Result<Json<ConfirmationResponse>> {
        let confirmation = PaymentService::confirm(&state.db, state.invoices()?, &ctx, &token).await?;
        Ok(Json(confirmation))
    }
}
