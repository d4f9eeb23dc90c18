use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use crate::{
    auth::models::MessageResponse,
    middlewares::mw_auth::Ctx,
    models::{
        music::{ArtistDashboard, MusicListQuery, MusicUploadForm, MusicView, UploadedFile},
        review::{ReviewPayload, ReviewView},
    },
    services::{
        entitlement_service::{EntitlementService, PlaybackWindow},
        music_service::MusicService,
    },
    AppState, Error, Result,
};

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub music: MusicView,
}

#[derive(Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    pub review: ReviewView,
}

#[derive(Serialize)]
pub struct ListenResponse {
    pub streams: u64,
}

pub struct MusicController;

impl MusicController {
    pub async fn upload_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        multipart: Multipart,
    ) -> Result<(StatusCode, Json<UploadResponse>)> {
        let form = read_upload_form(multipart).await?;
        let music = MusicService::upload(&state.db, state.media()?, &ctx.user_id, form).await?;

        Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                message: "Musique uploadée !".to_string(),
                music,
            }),
        ))
    }

    pub async fn list_handler(
        State(state): State<AppState>,
        ctx: Option<Extension<Ctx>>,
        Query(query): Query<MusicListQuery>,
    ) -> Result<Json<Vec<MusicView>>> {
        let ctx = ctx.map(|Extension(ctx)| ctx);
        let musics = MusicService::list(&state.db, ctx.as_ref(), query).await?;
        Ok(Json(musics))
    }

    pub async fn buy_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Path(music_id): Path<String>,
    ) -> Result<Json<MessageResponse>> {
        EntitlementService::purchase(&state.db, &ctx.user_id, &music_id).await?;
        Ok(Json(MessageResponse::new(
            "Achat réussi, musique débloquée !",
        )))
    }

    pub async fn review_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Path(music_id): Path<String>,
        Json(payload): Json<ReviewPayload>,
    ) -> Result<Json<ReviewResponse>> {
        let review = EntitlementService::review(&state.db, &ctx.user_id, &music_id, payload).await?;
        Ok(Json(ReviewResponse {
            success: true,
            review,
        }))
    }

    pub async fn reviews_handler(
        State(state): State<AppState>,
        Path(music_id): Path<String>,
    ) -> Result<Json<Vec<ReviewView>>> {
        let reviews = MusicService::reviews(&state.db, &music_id).await?;
        Ok(Json(reviews))
    }

    pub async fn playback_handler(
        State(state): State<AppState>,
        ctx: Option<Extension<Ctx>>,
        Path(music_id): Path<String>,
    ) -> Result<Json<PlaybackWindow>> {
        let ctx = ctx.map(|Extension(ctx)| ctx);
        let window = EntitlementService::playback(&state.db, ctx.as_ref(), &music_id).await?;
        Ok(Json(window))
    }

    pub async fn listen_handler(
        State(state): State<AppState>,
        Path(music_id): Path<String>,
    ) -> Result<Json<ListenResponse>> {
        let streams = EntitlementService::listen(&state.db, &music_id).await?;
        Ok(Json(ListenResponse { streams }))
    }

    pub async fn artist_dashboard_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
    ) -> Result<Json<ArtistDashboard>> {
        let dashboard = MusicService::artist_dashboard(&state.db, &ctx.user_id).await?;
        Ok(Json(dashboard))
    }
}

/// Collects the text fields and the `cover` / `audio` files of the form.
async fn read_upload_form(mut multipart: Multipart) -> Result<MusicUploadForm> {
    let mut form = MusicUploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "cover" | "audio" => {
                let file = UploadedFile {
                    file_name: field.file_name().unwrap_or(&name).to_string(),
                    content_type: field.content_type().map(str::to_string),
                    bytes: field.bytes().await.map_err(multipart_error)?.to_vec(),
                };
                if name == "cover" {
                    form.cover = Some(file);
                } else {
                    form.audio = Some(file);
                }
            }
            "title" | "genre" | "price" | "description" => {
                let value = Some(field.text().await.map_err(multipart_error)?);
                match name.as_str() {
                    "title" => form.title = value,
                    "genre" => form.genre = value,
                    "price" => form.price = value,
                    _ => form.description = value,
                }
            }
            other => tracing::debug!("ignoring upload field {}", other),
        }
    }

    Ok(form)
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> Error {
    Error::InvalidInput {
        reason: e.body_text(),
    }
}
