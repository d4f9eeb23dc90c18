use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::{
    middlewares::mw_auth::Ctx,
    models::user::{FollowToggle, FollowersView, PublicProfile},
    services::{follow_service::FollowService, user_service::UserService},
    AppState, Error, Result,
};

pub struct UserController;

impl UserController {
    pub async fn get_user_profile(
        State(state): State<AppState>,
        Path(user_id): Path<String>,
    ) -> Result<Json<PublicProfile>> {
        if user_id.trim().is_empty() {
            return Err(Error::InvalidInput {
                reason: "L'ID utilisateur ne peut pas être vide".to_string(),
            });
        }

        let profile = UserService::get_public_profile(&state.db, &user_id).await?;
        Ok(Json(profile))
    }

    pub async fn get_followers(
        State(state): State<AppState>,
        Path(artist_id): Path<String>,
    ) -> Result<Json<FollowersView>> {
        let followers = UserService::get_followers(&state.db, &artist_id).await?;
        Ok(Json(followers))
    }

    pub async fn toggle_follow(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Path(artist_id): Path<String>,
    ) -> Result<Json<FollowToggle>> {
        let toggle =
            FollowService::toggle_follow(&state.db, &state.events, &ctx.user_id, &artist_id).await?;
        Ok(Json(toggle))
    }
}
