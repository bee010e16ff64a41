//! Response DTOs for the catalog API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::catalog::Entry;
use crate::media::Movie;

/// Where a film lookup was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupSource {
    Cache,
    Store,
    Api,
}

/// Response body for a film lookup (GET /films/:imdb)
#[derive(Debug, Clone, Serialize)]
pub struct FilmResponse {
    /// True when the record came from the cache
    pub cached: bool,
    /// Which tier answered
    pub source: LookupSource,
    /// The movie record
    pub movie: Movie,
}

impl FilmResponse {
    pub fn new(movie: Movie, source: LookupSource) -> Self {
        Self {
            cached: source == LookupSource::Cache,
            source,
            movie,
        }
    }
}

/// Response body for saving a film or an entry
/// (POST /films/:imdb, POST /films/:imdb/entry)
#[derive(Debug, Clone, Serialize)]
pub struct InfoResponse {
    pub movie: Movie,
    /// Every entry saved for the movie, oldest first
    pub entries: Vec<Entry>,
}

/// Response body for updating entries (PUT /films/:imdb/entry)
#[derive(Debug, Clone, Serialize)]
pub struct EntriesResponse {
    pub imdb_id: String,
    pub entries: Vec<Entry>,
}

/// Response body for the saved-movie check (GET /check/:imdb)
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    pub imdb_id: String,
    pub exists: bool,
}

/// Response body for dropping a cached film (DELETE /films/:imdb)
#[derive(Debug, Clone, Serialize)]
pub struct EvictResponse {
    /// Status message
    pub message: String,
    /// The IMDb id that was targeted
    pub imdb_id: String,
    /// Whether a cached record was actually removed
    pub removed: bool,
}

impl EvictResponse {
    /// Creates a new EvictResponse
    pub fn new(imdb_id: impl Into<String>, removed: bool) -> Self {
        let imdb_id = imdb_id.into();
        let message = if removed {
            format!("'{}' removed from cache", imdb_id)
        } else {
            format!("'{}' was not cached", imdb_id)
        };
        Self {
            message,
            imdb_id,
            removed,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Values disposed of by overwrite, expiry or close
    pub evictions: u64,
    /// Entries removed for being idle
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Clients currently tracked by the rate limiter
    pub tracked_clients: usize,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: &CacheStats, tracked_clients: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            tracked_clients,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
