//! Rate limiting middleware.
//!
//! Fixed-window request counting per client IP, kept in memory.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::warn;

use crate::app::errors::json_error;

const LIMIT_EXCEEDED: &str = "Too many requests from this IP, please try again later.";

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

/// Rate limiter state tracking requests per IP.
#[derive(Clone)]
pub struct RateLimitLayer {
    config: RateLimitConfig,
    state: Arc<Mutex<HashMap<IpAddr, RateLimitEntry>>>,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RateLimitResult {
    Allowed { remaining: u32, reset: Duration },
    Exceeded { reset: Duration },
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn check(&self, ip: IpAddr, now: Instant) -> RateLimitResult {
        let mut state = self.state.lock();

        let entry = state.entry(ip).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.config.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count = entry.count.saturating_add(1);
        let reset = (entry.window_start + self.config.window).saturating_duration_since(now);

        if entry.count > self.config.max_requests {
            RateLimitResult::Exceeded { reset }
        } else {
            RateLimitResult::Allowed {
                remaining: self.config.max_requests - entry.count,
                reset,
            }
        }
    }

    /// Drop entries whose window has long passed.
    pub fn cleanup(&self) {
        let mut state = self.state.lock();
        let now = Instant::now();
        let window = self.config.window;

        state.retain(|_, entry| now.duration_since(entry.window_start) < window * 2);
    }

    /// Periodically run [`cleanup`](Self::cleanup) until every clone of this limiter is dropped.
    pub fn spawn_cleanup(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let state: Weak<_> = Arc::downgrade(&self.state);
        let config = self.config.clone();
        handle.spawn(async move {
            let mut ticker = tokio::time::interval(config.window.max(Duration::from_secs(1)));
            loop {
                ticker.tick().await;
                let Some(state) = state.upgrade() else {
                    break;
                };
                RateLimitLayer {
                    config: config.clone(),
                    state,
                }
                .cleanup();
            }
        });
    }

    fn set_headers(&self, headers: &mut HeaderMap, remaining: u32, reset: Duration) {
        let reset_secs = reset.as_secs() + u64::from(reset.subsec_nanos() > 0);
        headers.insert("ratelimit-limit", HeaderValue::from(self.config.max_requests));
        headers.insert("ratelimit-remaining", HeaderValue::from(remaining));
        headers.insert("ratelimit-reset", HeaderValue::from(reset_secs));
    }
}

/// Rate limiting middleware function.
///
/// The client address comes from `ConnectInfo`; requests served without it
/// share one bucket.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimitLayer>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limiter.check(ip, Instant::now()) {
        RateLimitResult::Allowed { remaining, reset } => {
            let mut response = next.run(request).await;
            limiter.set_headers(response.headers_mut(), remaining, reset);
            response
        }
        RateLimitResult::Exceeded { reset } => {
            warn!(
                ip = %ip,
                retry_after_secs = reset.as_secs(),
                "Rate limit exceeded"
            );

            let mut response = json_error(StatusCode::TOO_MANY_REQUESTS, LIMIT_EXCEEDED);
            limiter.set_headers(response.headers_mut(), 0, reset);
            response
                .headers_mut()
                .insert("retry-after", HeaderValue::from(reset.as_secs().max(1)));
            response
        }
    }
}
