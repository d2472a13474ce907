use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;

use crate::models::dto::ErrorEnvelope;
use crate::AppState;

const LIMIT_HEADER: HeaderName = HeaderName::from_static("ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RESET_HEADER: HeaderName = HeaderName::from_static("ratelimit-reset");

#[derive(Debug)]
struct Window {
    count: u32,
    started: Instant,
}

/// Accounting for a request that was let through.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: u64,
}

/// Process-wide fixed-window request counter keyed by client IP.
#[derive(Debug)]
pub struct RateLimiter {
    entries: DashMap<IpAddr, Window>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_requests,
            window,
        }
    }

    /// Consume one slot for `ip`. Returns the remaining budget, or the
    /// number of seconds until the window resets when exhausted.
    pub fn check(&self, ip: IpAddr) -> Result<RateLimitInfo, u64> {
        let now = Instant::now();
        let mut entry = self.entries.entry(ip).or_insert_with(|| Window {
            count: 0,
            started: now,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.count = 0;
            entry.started = now;
        }

        let reset_after = self
            .window
            .saturating_sub(now.duration_since(entry.started))
            .as_secs();

        if entry.count < self.max_requests {
            entry.count += 1;
            Ok(RateLimitInfo {
                limit: self.max_requests,
                remaining: self.max_requests - entry.count,
                reset_after,
            })
        } else {
            Err(reset_after.max(1))
        }
    }
}

/// Global throttle. Requests without connect-info (router-level tests)
/// pass through unmetered.
pub async fn throttle(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let Some(ip) = ip else {
        return next.run(req).await;
    };

    match state.limiter.check(ip) {
        Ok(info) => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert(LIMIT_HEADER, number_header(info.limit as u64));
            headers.insert(REMAINING_HEADER, number_header(info.remaining as u64));
            headers.insert(RESET_HEADER, number_header(info.reset_after));
            response
        }
        Err(retry_after) => {
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorEnvelope::new(
                    "Too many requests, please try again later.",
                )),
            )
                .into_response();
            let headers = response.headers_mut();
            headers.insert(LIMIT_HEADER, number_header(state.limiter.max_requests as u64));
            headers.insert(REMAINING_HEADER, number_header(0));
            headers.insert(RESET_HEADER, number_header(retry_after));
            headers.insert(
                axum::http::header::RETRY_AFTER,
                number_header(retry_after),
            );
            response
        }
    }
}

fn number_header(value: u64) -> HeaderValue {
    // u64's Display form is always a valid header value
    HeaderValue::from_str(&value.to_string()).unwrap_or(HeaderValue::from_static("0"))
}
