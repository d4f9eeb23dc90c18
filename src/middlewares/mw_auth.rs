use crate::auth::capability::{authorize, Capability};
use crate::auth::token_service::{Claims, TokenService};
use crate::error::{Error, Result};
use crate::helpers::thing_helpers::parse_id_part;
use crate::models::user::Role;
use crate::AppState;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use serde::{Deserialize, Serialize};

/// Identity of the caller, built from a verified bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ctx {
    pub user_id: String,
    pub role: Role,
    pub exp: usize,
}

impl Ctx {
    pub fn new(user_id: String, role: Role, exp: usize) -> Self {
        Self { user_id, role, exp }
    }

    fn from_claims(claims: Claims) -> Self {
        let user_id = parse_id_part(&claims.sub).to_string();
        Self::new(user_id, claims.role, claims.exp)
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(Error::AuthFailNoAuthToken)?
        .to_str()
        .map_err(|_| Error::AuthFailTokenWrongFormat)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(Error::AuthFailTokenWrongFormat)
}

pub async fn mw_auth(
    State(app_state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(req.headers())?;
    let claims = TokenService::validate_token(token, &app_state.auth_config)?;
    let ctx = Ctx::from_claims(claims);
    authorize(&ctx, Capability::Authenticated)?;

    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

/// Like [`mw_auth`], but lets anonymous requests through. A present but
/// invalid token is still refused.
pub async fn mw_auth_optional(
    State(app_state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response> {
    if req.headers().contains_key(header::AUTHORIZATION) {
        let token = bearer_token(req.headers())?;
        let claims = TokenService::validate_token(token, &app_state.auth_config)?;
        req.extensions_mut().insert(Ctx::from_claims(claims));
    }

    Ok(next.run(req).await)
}
