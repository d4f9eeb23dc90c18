use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{
    models::{
        admin::AdminStats,
        music::MusicView,
        user::{ChangeRolePayload, UserView},
    },
    services::admin_service::AdminService,
    AppState, Result,
};

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

pub struct AdminController;

impl AdminController {
    pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserView>>> {
        Ok(Json(AdminService::list_users(&state.db).await?))
    }

    pub async fn delete_user(
        State(state): State<AppState>,
        Path(user_id): Path<String>,
    ) -> Result<Json<SuccessResponse>> {
        AdminService::delete_user(&state.db, &user_id).await?;
        Ok(Json(SuccessResponse { success: true }))
    }

    pub async fn change_role(
        State(state): State<AppState>,
        Path(user_id): Path<String>,
        Json(payload): Json<ChangeRolePayload>,
    ) -> Result<Json<UserView>> {
        let user = AdminService::change_role(&state.db, &user_id, payload.role).await?;
        Ok(Json(user))
    }

    pub async fn list_musics(State(state): State<AppState>) -> Result<Json<Vec<MusicView>>> {
        Ok(Json(AdminService::list_musics(&state.db).await?))
    }

    pub async fn delete_music(
        State(state): State<AppState>,
        Path(music_id): Path<String>,
    ) -> Result<Json<SuccessResponse>> {
        AdminService::delete_music(&state.db, &music_id).await?;
        Ok(Json(SuccessResponse { success: true }))
    }

    pub async fn stats(State(state): State<AppState>) -> Result<Json<AdminStats>> {
        Ok(Json(AdminService::stats(&state.db).await?))
    }
}
