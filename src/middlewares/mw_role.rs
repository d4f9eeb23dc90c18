use axum::{body::Body, extract::Request, middleware::Next, response::Response};

use crate::{
    auth::capability::{authorize, Capability},
    error::{Error, Result},
    middlewares::mw_auth::Ctx,
};

async fn require(capability: Capability, req: Request<Body>, next: Next) -> Result<Response> {
    let ctx = req
        .extensions()
        .get::<Ctx>()
        .ok_or(Error::AuthFailCtxNotInRequestExt)?;

    authorize(ctx, capability)?;

    Ok(next.run(req).await)
}

/// Must be layered inside `mw_auth`.
pub async fn mw_require_artist(req: Request<Body>, next: Next) -> Result<Response> {
    require(Capability::Artist, req, next).await
}

/// Must be layered inside `mw_auth`.
pub async fn mw_require_admin(req: Request<Body>, next: Next) -> Result<Response> {
    require(Capability::Admin, req, next).await
}
