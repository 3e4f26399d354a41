//! Request budget for the dbt Cloud API
//!
//! A direct governor limiter refilled per minute, with the whole minute
//! available as the initial burst.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Requests per minute allowed by the dbt Cloud API
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 3000;

/// Shared per-minute request budget
#[derive(Clone)]
pub struct RequestBudget {
    per_minute: NonZeroU32,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RequestBudget {
    /// A budget of `per_minute` requests; zero is raised to one
    pub fn per_minute(per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            per_minute,
            limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
        }
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.per_minute.get()
    }

    /// Wait for the next request slot
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Take a slot if one is free right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for RequestBudget {
    fn default() -> Self {
        Self::per_minute(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

impl std::fmt::Debug for RequestBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBudget")
            .field("per_minute", &self.per_minute)
            .finish_non_exhaustive()
    }
}
