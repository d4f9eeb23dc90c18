use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use crate::{
    auth::models::MessageResponse,
    middlewares::mw_auth::Ctx,
    models::{
        pagination::PaginationQuery,
        video::{
            AdminVideoQuery, CommentPayload, CommentView, CreateVideoPayload, LikeToggle,
            UpdateVideoPayload, VideoStats, VideoView,
        },
    },
    services::video_service::VideoService,
    AppState, Result,
};

#[derive(Serialize)]
pub struct ValidationResponse {
    pub message: String,
    pub video: VideoView,
}

pub struct VideoController;

impl VideoController {
    pub async fn feed_handler(
        State(state): State<AppState>,
        Query(pagination): Query<PaginationQuery>,
    ) -> Result<Json<Vec<VideoView>>> {
        let videos = VideoService::feed(&state.db, &pagination).await?;
        Ok(Json(videos))
    }

    pub async fn create_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Json(payload): Json<CreateVideoPayload>,
    ) -> Result<(StatusCode, Json<VideoView>)> {
        let video = VideoService::create(&state.db, &ctx.user_id, payload).await?;
        Ok((StatusCode::CREATED, Json(video)))
    }

    pub async fn validate_handler(
        State(state): State<AppState>,
        Path(video_id): Path<String>,
    ) -> Result<Json<ValidationResponse>> {
        let video = VideoService::validate(&state.db, &video_id).await?;
        Ok(Json(ValidationResponse {
            message: "Vidéo validée.".to_string(),
            video,
        }))
    }

    pub async fn my_videos_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
    ) -> Result<Json<Vec<VideoView>>> {
        let videos = VideoService::my_videos(&state.db, &ctx.user_id).await?;
        Ok(Json(videos))
    }

    pub async fn delete_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Path(video_id): Path<String>,
    ) -> Result<Json<MessageResponse>> {
        VideoService::delete(&state.db, &ctx, &video_id).await?;
        Ok(Json(MessageResponse::new("Vidéo supprimée.")))
    }

    pub async fn edit_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Path(video_id): Path<String>,
        Json(payload): Json<UpdateVideoPayload>,
    ) -> Result<Json<VideoView>> {
        let video = VideoService::edit(&state.db, &ctx, &video_id, payload).await?;
        Ok(Json(video))
    }

    pub async fn like_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Path(video_id): Path<String>,
    ) -> Result<Json<LikeToggle>> {
        let toggle = VideoService::toggle_like(&state.db, &state.events, &ctx, &video_id).await?;
        Ok(Json(toggle))
    }

    pub async fn comment_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Path(video_id): Path<String>,
        Json(payload): Json<CommentPayload>,
    ) -> Result<(StatusCode, Json<CommentView>)> {
        let comment =
            VideoService::comment(&state.db, &state.events, &ctx, &video_id, payload.text).await?;
        Ok((StatusCode::CREATED, Json(comment)))
    }

    pub async fn comments_handler(
        State(state): State<AppState>,
        ctx: Option<Extension<Ctx>>,
        Path(video_id): Path<String>,
    ) -> Result<Json<Vec<CommentView>>> {
        let ctx = ctx.map(|Extension(ctx)| ctx);
        let comments = VideoService::comments(&state.db, ctx.as_ref(), &video_id).await?;
        Ok(Json(comments))
    }

    pub async fn stats_handler(
        State(state): State<AppState>,
        ctx: Option<Extension<Ctx>>,
        Path(video_id): Path<String>,
    ) -> Result<Json<VideoStats>> {
        let ctx = ctx.map(|Extension(ctx)| ctx);
        let stats = VideoService::stats(&state.db, ctx.as_ref(), &video_id).await?;
        Ok(Json(stats))
    }

    pub async fn list_all_handler(
        State(state): State<AppState>,
        Query(query): Query<AdminVideoQuery>,
    ) -> Result<Json<Vec<VideoView>>> {
        let videos = VideoService::list_all(&state.db, query.validated).await?;
        Ok(Json(videos))
    }
}
