use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
    Extension, Json,
};
use reqwest::Url;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::models::{
        ChangePasswordPayload, ForgotPasswordPayload, LoginPayload, MeResponse, MessageResponse,
        RegisterPayload, ResetPasswordPayload, SocialRolePayload, TokenResponse,
    },
    helpers::user_helpers::get_user,
    middlewares::mw_auth::Ctx,
    models::{
        music::MusicView,
        user::{UpdateProfilePayload, UserRecord, UserView},
    },
    services::{
        auth_service::{AuthService, NewAccount},
        entitlement_service::EntitlementService,
    },
    AppState, Error, Result,
};

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub struct AuthController;

impl AuthController {
    pub async fn register_handler(
        State(state): State<AppState>,
        Json(payload): Json<RegisterPayload>,
    ) -> Result<(StatusCode, Json<TokenResponse>)> {
        let (Some(name), Some(email), Some(password)) =
            (payload.name, payload.email, payload.password)
        else {
            return Err(Error::MissingFields);
        };

        let user = AuthService::register_user(
            &state.db,
            NewAccount {
                name,
                email,
                password,
                role: payload.role.unwrap_or_default(),
                referred_by: payload.referred_by,
            },
        )
        .await?;

        Ok((StatusCode::CREATED, Json(token_response(user, &state)?)))
    }

    pub async fn login_handler(
        State(state): State<AppState>,
        Json(payload): Json<LoginPayload>,
    ) -> Result<Json<TokenResponse>> {
        let (Some(email), Some(password)) = (payload.email, payload.password) else {
            return Err(Error::MissingFields);
        };

        let user = AuthService::login_user(&state.db, &email, &password).await?;
        Ok(Json(token_response(user, &state)?))
    }

    pub async fn me_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
    ) -> Result<Json<MeResponse>> {
        let user = get_user(&state.db, &ctx.user_id).await?;
        Ok(Json(MeResponse {
            user: UserView::from(user),
        }))
    }

    pub async fn update_me_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Json(payload): Json<UpdateProfilePayload>,
    ) -> Result<Json<MeResponse>> {
        let user = AuthService::update_profile(&state.db, &ctx.user_id, payload).await?;
        Ok(Json(MeResponse {
            user: UserView::from(user),
        }))
    }

    pub async fn change_password_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Json(payload): Json<ChangePasswordPayload>,
    ) -> Result<Json<MessageResponse>> {
        let (Some(current), Some(new)) = (payload.current_password, payload.new_password) else {
            return Err(Error::MissingFields);
        };

        AuthService::change_password(&state.db, &ctx.user_id, &current, &new).await?;
        Ok(Json(MessageResponse::new("Mot de passe modifié.")))
    }

    pub async fn library_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
    ) -> Result<Json<Vec<MusicView>>> {
        let library = EntitlementService::library(&state.db, &ctx.user_id).await?;
        Ok(Json(library))
    }

    pub async fn forgot_password_handler(
        State(state): State<AppState>,
        Json(payload): Json<ForgotPasswordPayload>,
    ) -> Result<Json<MessageResponse>> {
        let email = payload.email.ok_or(Error::MissingFields)?;

        AuthService::forgot_password(
            &state.db,
            state.mailer.as_ref(),
            &state.frontend_url,
            &email,
        )
        .await?;

        Ok(Json(MessageResponse::new(
            "Si un compte existe avec cet email, un lien de réinitialisation a été envoyé.",
        )))
    }

    pub async fn reset_password_handler(
        State(state): State<AppState>,
        Path(token): Path<String>,
        Json(payload): Json<ResetPasswordPayload>,
    ) -> Result<Json<MessageResponse>> {
        let password = payload.password.ok_or(Error::MissingFields)?;

        AuthService::reset_password(&state.db, &token, &password).await?;
        Ok(Json(MessageResponse::new("Mot de passe réinitialisé.")))
    }

    pub async fn social_role_handler(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Json(payload): Json<SocialRolePayload>,
    ) -> Result<Json<TokenResponse>> {
        let user = AuthService::set_social_role(&state.db, &ctx.user_id, payload.role).await?;
        Ok(Json(token_response(user, &state)?))
    }

    pub async fn google_redirect_handler(State(state): State<AppState>) -> Result<Redirect> {
        let identity = state.identity()?;

        let oauth_state = Uuid::new_v4().simple().to_string();
        let url = identity.authorize_url(&oauth_state)?;
        state.oauth_states.insert(oauth_state, ()).await;

        Ok(Redirect::to(&url))
    }

    /// Always ends on the frontend, carrying either a token or an error.
    pub async fn google_callback_handler(
        State(state): State<AppState>,
        Query(query): Query<OAuthCallbackQuery>,
    ) -> Redirect {
        let param = match google_login(&state, query).await {
            Ok(token) => ("token", token),
            Err(e) => {
                tracing::warn!("google login failed: {:?}", e);
                ("error", e.to_string())
            }
        };

        let callback = format!("{}/social-callback", state.frontend_url.trim_end_matches('/'));
        match Url::parse_with_params(&callback, [param]) {
            Ok(url) => Redirect::to(url.as_str()),
            Err(e) => {
                tracing::error!("invalid FRONTEND_URL: {}", e);
                Redirect::to(&callback)
            }
        }
    }
}

async fn google_login(state: &AppState, query: OAuthCallbackQuery) -> Result<String> {
    if let Some(error) = query.error {
        return Err(Error::IdentityProvider { message: error });
    }

    let oauth_state = query.state.ok_or(Error::InvalidOAuthState)?;
    if state.oauth_states.remove(&oauth_state).await.is_none() {
        return Err(Error::InvalidOAuthState);
    }

    let code = query.code.ok_or(Error::InvalidOAuthState)?;
    let profile = state.identity()?.fetch_profile(&code).await?;
    let user = AuthService::social_login(&state.db, profile).await?;

    AuthService::issue_token(&user, &state.auth_config)
}

fn token_response(user: UserRecord, state: &AppState) -> Result<TokenResponse> {
    let token = AuthService::issue_token(&user, &state.auth_config)?;
    Ok(TokenResponse {
        token,
        user: UserView::from(user),
    })
}
