//! Shared fixtures for the API unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{AppState, MovieCache};
use crate::error::{ApiError, Result};
use crate::media::{MetadataSource, Movie};
use crate::rate::RateLimiter;

/// Knows a single title, Heat (tt0113277), and counts lookups.
#[derive(Default)]
pub struct StubSource {
    calls: AtomicUsize,
}

impl StubSource {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for StubSource {
    async fn movie_by_id(&self, imdb_id: &str) -> Result<Movie> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if imdb_id != "tt0113277" {
            return Err(ApiError::NotFound(imdb_id.to_string()));
        }

        Ok(heat())
    }
}

/// The one title [`StubSource`] knows.
pub fn heat() -> Movie {
    Movie {
        title: "Heat".to_string(),
        year: "1995".to_string(),
        director: "Michael Mann".to_string(),
        imdb_id: "tt0113277".to_string(),
        kind: "movie".to_string(),
        response: "True".to_string(),
        ..Movie::default()
    }
}

/// State with long-lived cache entries and `rate` requests per minute.
pub fn test_state(source: Arc<StubSource>, rate: u32) -> AppState {
    let minute = Duration::from_secs(60);
    AppState::new(
        MovieCache::new(minute, minute),
        RateLimiter::new(rate, minute),
        source,
    )
}
