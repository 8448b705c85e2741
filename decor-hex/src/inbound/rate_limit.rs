//! Rate limiting middleware using Governor.
//!
//! Implements per-caller rate limiting with a token bucket algorithm. Callers
//! are keyed by peer IP address; request headers play no part. Buckets idle
//! for a full period are evicted.

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde_json::json;
use std::{
    net::SocketAddr,
    num::NonZeroU32,
    sync::Arc,
    time::{Duration, Instant},
};

/// Seconds a limited caller is told to wait.
pub const RETRY_AFTER_SECONDS: u64 = 60;

/// Key for requests that arrive without peer information.
const UNKNOWN_PEER: &str = "unknown";

struct Bucket {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    last_seen: Instant,
}

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    /// Per-caller buckets
    buckets: DashMap<String, Bucket>,
    /// Quota for new callers
    quota: Quota,
    /// Time for an empty bucket to refill completely
    period: Duration,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(60))
    }
}

impl RateLimiterState {
    /// Creates a limiter allowing `requests` per `period`, all of which may
    /// arrive as a burst. A zero request count is treated as one.
    pub fn new(requests: u32, period: Duration) -> Self {
        let burst = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(period / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            buckets: DashMap::new(),
            quota,
            period,
        }
    }

    /// Per-minute limiter.
    pub fn per_minute(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(60))
    }

    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| Bucket {
                limiter: RateLimiter::direct(self.quota),
                last_seen: Instant::now(),
            });

        bucket.last_seen = Instant::now();
        bucket.limiter.check().is_ok()
    }

    /// Drops buckets untouched for a full period. Such a bucket has refilled,
    /// so a fresh one behaves the same. Returns the number evicted.
    pub fn evict_idle(&self) -> usize {
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| bucket.last_seen.elapsed() < self.period);
        before - self.buckets.len()
    }

    /// Number of callers currently tracked.
    pub fn tracked(&self) -> usize {
        self.buckets.len()
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

/// Evicts idle buckets once per period, forever.
pub async fn evict_idle_buckets(limiter: Arc<RateLimiterState>) {
    let mut ticker = tokio::time::interval(limiter.period().max(Duration::from_secs(1)));
    loop {
        ticker.tick().await;
        let evicted = limiter.evict_idle();
        if evicted > 0 {
            tracing::debug!(
                evicted,
                tracked = limiter.tracked(),
                "Evicted idle rate limit buckets"
            );
        }
    }
}

fn caller_key(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_PEER.to_string())
}

/// Rate limiting middleware. `/health` is never limited.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    if !limiter.check(&caller_key(&request)) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "retry_after_seconds": RETRY_AFTER_SECONDS
            })),
        )
            .into_response();
    }

    next.run(request).await
}
