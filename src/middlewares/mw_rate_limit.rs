use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use moka::future::Cache;

use crate::{middlewares::mw_auth::Ctx, AppState};

const MAX_REQUESTS_PER_WINDOW: usize = 150;
const WINDOW: Duration = Duration::from_secs(60);

/// Request counters keyed by user or IP. Entries expire one window after
/// their first request.
pub type RateLimitCache = Cache<String, Arc<AtomicUsize>>;

pub fn new_rate_limit_cache() -> RateLimitCache {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(WINDOW)
        .build()
}

/// Global rate limiting middleware that only blocks heavy spammers
/// (150 requests per minute per user or IP).
pub async fn rate_limit_middleware(
    State(app_state): State<AppState>,
    ConnectInfo(ip): ConnectInfo<SocketAddr>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let identifier = req
        .extensions()
        .get::<Ctx>()
        .map(|ctx| format!("user:{}", ctx.user_id))
        .unwrap_or_else(|| format!("ip:{}", ip.ip()));

    if !register_request(&app_state.rate_limit_cache, identifier.clone()).await {
        tracing::warn!("rate limit exceeded for {}", identifier);
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    Ok(next.run(req).await)
}

/// Counts one request for `identifier`; false once the window is exhausted.
async fn register_request(cache: &RateLimitCache, identifier: String) -> bool {
    let counter = cache
        .get_with(identifier, async { Arc::new(AtomicUsize::new(0)) })
        .await;

    counter.fetch_add(1, Ordering::Relaxed) < MAX_REQUESTS_PER_WINDOW
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_per_identifier() {
        let cache = new_rate_limit_cache();

        for _ in 0..MAX_REQUESTS_PER_WINDOW {
            assert!(register_request(&cache, "ip:1".to_string()).await);
        }
        assert!(!register_request(&cache, "ip:1".to_string()).await);

        // Other callers are unaffected.
        assert!(register_request(&cache, "ip:2".to_string()).await);
    }
}
