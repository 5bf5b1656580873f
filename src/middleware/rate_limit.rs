use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// Shared per-second request budget for a router group. The window start is
/// guarded by a mutex; admissions within a window only touch the atomic
/// counter.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

struct Inner {
    rps: u32,
    window_start: Mutex<Instant>,
    admitted: AtomicU32,
}

impl RateLimiter {
    pub fn per_second(rps: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                rps: rps.max(1),
                window_start: Mutex::new(Instant::now()),
                admitted: AtomicU32::new(0),
            }),
        }
    }

    fn try_acquire(&self) -> bool {
        {
            let mut start = self
                .inner
                .window_start
                .lock()
                .expect("rate limiter mutex poisoned");
            if start.elapsed() >= Duration::from_secs(1) {
                *start = Instant::now();
                self.inner.admitted.store(0, Ordering::Relaxed);
            }
        }
        self.inner.admitted.fetch_add(1, Ordering::Relaxed) < self.inner.rps
    }
}

pub async fn limit_requests(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.try_acquire() {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "rate_limit_exceeded" })),
        )
            .into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_the_configured_budget() {
        let limiter = RateLimiter::per_second(3);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn zero_rps_still_admits_one_request() {
        let limiter = RateLimiter::per_second(0);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }
}
