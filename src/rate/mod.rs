//! Rate Limiting Module
//!
//! Per-client fixed-window request throttling.

mod limiter;

pub use limiter::{RateLimiter, DEFAULT_PURGE_INTERVAL};
