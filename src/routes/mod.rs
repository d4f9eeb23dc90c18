//! Route tables, one struct per resource, plus the gates they are wrapped in.
//!
//! Layers added last run first, so authentication always runs before the
//! rate limiter (which keys on the user when there is one) and before the
//! role checks.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    Router,
};

use crate::{
    middlewares::{
        mw_auth::{mw_auth, mw_auth_optional},
        mw_rate_limit::rate_limit_middleware,
        mw_role::{mw_require_admin, mw_require_artist},
    },
    AppState,
};

pub mod admin_routes;
pub mod auth_routes;
pub mod event_routes;
pub mod music_routes;
pub mod payment_routes;
pub mod user_routes;
pub mod video_routes;

pub fn public(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    router.route_layer(from_fn_with_state(app_state.clone(), rate_limit_middleware))
}

/// Anonymous callers pass; a bearer token, when sent, must be valid.
pub fn optional_auth(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    public(router, app_state)
        .route_layer(from_fn_with_state(app_state.clone(), mw_auth_optional))
}

pub fn authenticated(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    public(router, app_state).route_layer(from_fn_with_state(app_state.clone(), mw_auth))
}

pub fn artist_only(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    authenticated(router.route_layer(from_fn(mw_require_artist)), app_state)
}

pub fn admin_only(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    authenticated(router.route_layer(from_fn(mw_require_admin)), app_state)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{
        body::Body,
        extract::connect_info::MockConnectInfo,
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        auth::token_service::{test_config, TokenService},
        models::user::Role,
        routes::{music_routes::MusicRoutes, video_routes::VideoRoutes},
        test_support::{app_state, setup_db},
    };

    async fn app() -> Router {
        let state = app_state(setup_db().await);
        Router::new()
            .nest("/music", MusicRoutes::routes(&state))
            .nest("/video", VideoRoutes::routes(&state))
            .with_state(state)
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 3000))))
    }

    async fn send(app: &Router, method: Method, uri: &str, role: Option<Role>) -> StatusCode {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(role) = role {
            let token = TokenService::create_token("u1".to_string(), role, &test_config()).unwrap();
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_artist_routes_refuse_other_roles() {
        let app = app().await;

        assert_eq!(
            send(&app, Method::POST, "/music/upload", None).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            send(&app, Method::POST, "/music/upload", Some(Role::Fan)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            send(&app, Method::POST, "/music/upload", Some(Role::Admin)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            send(&app, Method::GET, "/music/artist-dashboard", Some(Role::Fan)).await,
            StatusCode::FORBIDDEN
        );

        // Past the gate, the empty body is the handler's problem.
        let artist = send(&app, Method::POST, "/music/upload", Some(Role::Artist)).await;
        assert_ne!(artist, StatusCode::UNAUTHORIZED);
        assert_ne!(artist, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_routes_refuse_other_roles() {
        let app = app().await;

        assert_eq!(
            send(&app, Method::PATCH, "/video/v1/validate", None).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            send(&app, Method::PATCH, "/video/v1/validate", Some(Role::Fan)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            send(&app, Method::PATCH, "/video/v1/validate", Some(Role::Artist)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            send(&app, Method::GET, "/video/all", Some(Role::Fan)).await,
            StatusCode::FORBIDDEN
        );

        assert_eq!(
            send(&app, Method::PATCH, "/video/v1/validate", Some(Role::Admin)).await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_public_feed_needs_no_token() {
        let app = app().await;

        assert_eq!(send(&app, Method::GET, "/video", None).await, StatusCode::OK);
        assert_eq!(
            send(&app, Method::GET, "/music", Some(Role::Fan)).await,
            StatusCode::OK
        );
    }
}
