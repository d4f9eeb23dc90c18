use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request, Response},
    Router,
};
use surrealdb::{
    engine::any::{self, Any},
    opt::auth::Root,
    Surreal,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;
use uuid::Uuid;

use crate::{
    auth::token_service::AuthConfig,
    config::ServerConfig,
    events::ServerSentEvents,
    middlewares::mw_rate_limit::{new_rate_limit_cache, RateLimitCache},
    models::database_helpers::define_indexes,
    routes::{
        admin_routes::AdminRoutes, auth_routes::AuthRoutes, event_routes::EventRoutes,
        music_routes::MusicRoutes, payment_routes::PaymentRoutes, user_routes::UserRoutes,
        video_routes::VideoRoutes,
    },
    services::{
        cloudinary_service::{CloudinaryClient, CloudinaryConfig, MediaStore},
        google_oauth_service::{GoogleOAuthClient, GoogleOAuthConfig, IdentityProvider},
        mail_service::{HttpMailer, LogMailer, MailConfig, Mailer},
        paydunya_service::{InvoiceProvider, PaydunyaClient, PaydunyaConfig},
    },
};

pub use self::error::{Error, Result};

mod auth;
mod config;
mod controllers;
mod error;
mod events;
mod helpers;
mod middlewares;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

/// Uploads carry a cover and a full audio file.
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;
const OAUTH_STATE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Clone)]
struct AppState {
    db: Surreal<Any>,
    auth_config: AuthConfig,
    rate_limit_cache: RateLimitCache,
    /// Pending Google logins, keyed by the `state` sent to the provider.
    oauth_states: moka::future::Cache<String, ()>,
    events: Arc<ServerSentEvents>,
    invoices: Option<Arc<dyn InvoiceProvider>>,
    media: Option<Arc<dyn MediaStore>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
}

impl AppState {
    fn invoices(&self) -> Result<&dyn InvoiceProvider> {
        self.invoices.as_deref().ok_or_else(|| Error::PaymentProvider {
            message: "Le paiement n'est pas configuré.".to_string(),
        })
    }

    fn media(&self) -> Result<&dyn MediaStore> {
        self.media.as_deref().ok_or_else(|| Error::MediaProvider {
            message: "L'upload n'est pas configuré.".to_string(),
        })
    }

    fn identity(&self) -> Result<&dyn IdentityProvider> {
        self.identity.as_deref().ok_or_else(|| Error::IdentityProvider {
            message: "La connexion Google n'est pas configurée.".to_string(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    tracing::info!("Starting RAP2RUE API...");

    let db_url = std::env::var("DB_URL")?;
    let db_ns = std::env::var("DB_NS")?;
    let db_name = std::env::var("DB_NAME")?;
    let db_user = std::env::var("DB_USER")?;
    let db_password = std::env::var("DB_PASSWORD")?;

    tracing::info!("Connecting to database at: {}", db_url);

    let db = any::connect(&db_url).await?;
    db.signin(Root {
        username: &db_user,
        password: &db_password,
    })
    .await?;
    db.use_ns(&db_ns).use_db(&db_name).await?;
    define_indexes(&db).await?;

    tracing::info!("Database connected successfully!");

    let server_config = ServerConfig::from_env()?;
    let auth_config = AuthConfig::from_env()?;
    tracing::info!("Auth configuration loaded");

    let app_state = AppState {
        db,
        auth_config,
        rate_limit_cache: new_rate_limit_cache(),
        oauth_states: moka::future::Cache::builder()
            .max_capacity(10_000)
            .time_to_live(OAUTH_STATE_TTL)
            .build(),
        events: ServerSentEvents::new(),
        invoices: load_invoice_provider(),
        media: load_media_store(),
        identity: load_identity_provider(),
        mailer: load_mailer(),
        frontend_url: server_config.frontend_url.clone(),
    };

    let routes_api = Router::new()
        .nest("/auth", AuthRoutes::routes(&app_state))
        .nest("/music", MusicRoutes::routes(&app_state))
        .nest("/video", VideoRoutes::routes(&app_state))
        .nest("/payment", PaymentRoutes::routes(&app_state))
        .nest("/user", UserRoutes::routes(&app_state))
        .nest("/admin", AdminRoutes::routes(&app_state))
        .nest("/events", EventRoutes::routes(&app_state));

    let routes_all = Router::new()
        .nest("/api", routes_api)
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4();
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    tracing::info!("{} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
                    let status = response.status();
                    let latency_ms = latency.as_millis();

                    match status.as_u16() {
                        200..=299 => tracing::info!("{} ({}ms)", status, latency_ms),
                        400..=499 => tracing::warn!("⚠️ {} ({}ms)", status, latency_ms),
                        500..=599 => tracing::error!("❌ {} ({}ms)", status, latency_ms),
                        _ => tracing::info!("{} ({}ms)", status, latency_ms),
                    }
                }),
        )
        .layer(cors_layer(&server_config.allowed_origins));

    let addr = server_config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(
        listener,
        routes_all.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        tracing::warn!("ALLOWED_ORIGINS not set, accepting every origin");
        return CorsLayer::very_permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

fn load_invoice_provider() -> Option<Arc<dyn InvoiceProvider>> {
    match PaydunyaConfig::from_env() {
        Ok(config) => Some(Arc::new(PaydunyaClient::new(config))),
        Err(_) => {
            tracing::warn!("PAYDUNYA_* not set, checkout disabled");
            None
        }
    }
}

fn load_media_store() -> Option<Arc<dyn MediaStore>> {
    match CloudinaryConfig::from_env() {
        Ok(config) => Some(Arc::new(CloudinaryClient::new(config))),
        Err(_) => {
            tracing::warn!("CLOUDINARY_* not set, music upload disabled");
            None
        }
    }
}

fn load_identity_provider() -> Option<Arc<dyn IdentityProvider>> {
    match GoogleOAuthConfig::from_env() {
        Ok(config) => Some(Arc::new(GoogleOAuthClient::new(config))),
        Err(_) => {
            tracing::warn!("GOOGLE_* or BACKEND_URL not set, Google login disabled");
            None
        }
    }
}

fn load_mailer() -> Arc<dyn Mailer> {
    match MailConfig::from_env() {
        Some(config) => Arc::new(HttpMailer::new(config)),
        None => {
            tracing::warn!("MAIL_* not set, reset links are only logged");
            Arc::new(LogMailer)
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rap2rue_api=debug,tower_http=info,info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}
