//! Reelcache - time-bounded state behind a movie catalog service
//!
//! Provides a generic expiring cache and a per-client fixed-window rate
//! limiter, each cleaned up by a periodic background task, plus the HTTP
//! surface that uses them to memoize OMDb lookups.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod rate;
pub mod tasks;

pub use api::AppState;
pub use cache::ExpiringCache;
pub use catalog::CatalogStore;
pub use config::Config;
pub use rate::RateLimiter;
