//! Resilience patterns for graveyard-runtime.
//!
//! This module provides:
//! - Per-provider sliding-window rate limiting
//! - Retry with exponential backoff for transient failures
//! - Usage accounting across a run

mod rate_limiter;
mod retry;
mod usage;

pub use rate_limiter::{RateLimiter, RATE_WINDOW};
pub use retry::{backoff_policy, with_retries};
pub use usage::{ProviderUsage, UsageTracker};
