//! API Handlers
//!
//! HTTP request handlers for each catalog endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info};

use crate::cache::ExpiringCache;
use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::media::{validate_imdb_id, MetadataSource, Movie};
use crate::models::{
    CheckResponse, EntriesResponse, EntryRequest, EvictResponse, FilmResponse, HealthResponse,
    InfoResponse, LookupSource, StatsResponse,
};
use crate::rate::RateLimiter;

/// Cache of movie records keyed by IMDb id.
pub type MovieCache = ExpiringCache<String, Arc<Movie>>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Memoized metadata lookups
    pub movies: Arc<MovieCache>,
    /// Saved movies and their watch-list entries
    pub catalog: Arc<CatalogStore>,
    /// Per-client request throttling
    pub limiter: Arc<RateLimiter>,
    /// Where records come from when neither cache nor catalog has them
    pub source: Arc<dyn MetadataSource>,
    /// Key rate limits on `X-Forwarded-For` instead of the peer address
    pub trust_forwarded_for: bool,
}

impl AppState {
    /// Creates a new AppState from its parts, with an empty catalog.
    pub fn new(
        movies: MovieCache,
        limiter: RateLimiter,
        source: Arc<dyn MetadataSource>,
    ) -> Self {
        Self {
            movies: Arc::new(movies),
            catalog: Arc::new(CatalogStore::new()),
            limiter: Arc::new(limiter),
            source,
            trust_forwarded_for: false,
        }
    }

    /// Sets whether clients are identified by `X-Forwarded-For`.
    pub fn trusting_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// Starts the cache sweep and rate-limit purge tasks, so it must be called
    /// from within a tokio runtime.
    pub fn from_config(config: &Config, source: Arc<dyn MetadataSource>) -> Self {
        let movies = MovieCache::new(config.cache_sweep_interval(), config.cache_ttl());
        let limiter = RateLimiter::with_purge_interval(
            config.rate_limit,
            config.rate_window(),
            config.rate_purge_interval(),
        );
        Self::new(movies, limiter, source).trusting_forwarded_for(config.trust_forwarded_for)
    }

    /// Stops the background tasks and empties the cache.
    pub async fn close(&self) {
        self.movies.close().await;
        self.limiter.close().await;
    }
}

/// Finds a movie in the cache, then the catalog, then the metadata source.
///
/// Catalog and source hits are written back to the cache.
async fn lookup_movie(state: &AppState, imdb_id: &str) -> Result<(Arc<Movie>, LookupSource)> {
    if let Some(movie) = state.movies.get(imdb_id) {
        debug!(imdb_id, "Cache hit");
        return Ok((movie, LookupSource::Cache));
    }

    if let Some(movie) = state.catalog.movie(imdb_id) {
        debug!(imdb_id, "Catalog hit");
        state.movies.set(imdb_id.to_string(), movie.clone());
        return Ok((movie, LookupSource::Store));
    }

    debug!(imdb_id, "Cache and catalog miss");
    let movie = Arc::new(state.source.movie_by_id(imdb_id).await?);
    state.movies.set(imdb_id.to_string(), movie.clone());
    Ok((movie, LookupSource::Api))
}

fn validate_entry(request: &EntryRequest) -> Result<()> {
    match request.validate() {
        Some(reason) => Err(ApiError::InvalidRequest(reason)),
        None => Ok(()),
    }
}

/// Handler for GET /films/:imdb
///
/// Serves the movie from the cache, falling back to the catalog and then the
/// metadata source, and caching the result.
pub async fn film_handler(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
) -> Result<Json<FilmResponse>> {
    validate_imdb_id(&imdb_id)?;

    let (movie, source) = lookup_movie(&state, &imdb_id).await?;
    Ok(Json(FilmResponse::new(Movie::clone(&movie), source)))
}

/// Handler for POST /films/:imdb
///
/// Saves the movie to the catalog without adding an entry.
pub async fn save_film_handler(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
) -> Result<(StatusCode, Json<InfoResponse>)> {
    validate_imdb_id(&imdb_id)?;

    let (movie, _) = lookup_movie(&state, &imdb_id).await?;
    let status = if state.catalog.save_movie(movie.clone()) {
        info!(imdb_id = %imdb_id, "Movie saved");
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(InfoResponse {
            movie: Movie::clone(&movie),
            entries: state.catalog.entries(&imdb_id),
        }),
    ))
}

/// Handler for DELETE /films/:imdb
///
/// Drops the cached record so the next lookup goes to the catalog or source.
pub async fn evict_film_handler(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
) -> Result<Json<EvictResponse>> {
    validate_imdb_id(&imdb_id)?;

    let removed = state.movies.delete(&imdb_id).is_some();
    if removed {
        info!(imdb_id = %imdb_id, "Cached record dropped");
    }

    Ok(Json(EvictResponse::new(imdb_id, removed)))
}

/// Handler for POST /films/:imdb/entry
///
/// Adds a watch-list entry, saving the movie to the catalog if needed.
pub async fn create_entry_handler(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
    Json(request): Json<EntryRequest>,
) -> Result<(StatusCode, Json<InfoResponse>)> {
    validate_imdb_id(&imdb_id)?;
    validate_entry(&request)?;

    let (movie, _) = lookup_movie(&state, &imdb_id).await?;
    let entry = state
        .catalog
        .create_entry(movie.clone(), request.into_entry());
    info!(imdb_id = %imdb_id, entry_id = entry.id, "Entry created");

    Ok((
        StatusCode::CREATED,
        Json(InfoResponse {
            movie: Movie::clone(&movie),
            entries: state.catalog.entries(&imdb_id),
        }),
    ))
}

/// Handler for PUT /films/:imdb/entry
///
/// Overwrites the entries saved for the movie.
pub async fn update_entry_handler(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
    Json(request): Json<EntryRequest>,
) -> Result<Json<EntriesResponse>> {
    validate_imdb_id(&imdb_id)?;
    validate_entry(&request)?;

    let entries = state.catalog.update_entries(
        &imdb_id,
        &request.name,
        request.watched,
        &request.comment,
    );
    if entries.is_empty() {
        return Err(ApiError::NoEntries(imdb_id));
    }
    info!(imdb_id = %imdb_id, count = entries.len(), "Entries updated");

    Ok(Json(EntriesResponse { imdb_id, entries }))
}

/// Handler for DELETE /films/:imdb/entry
///
/// Removes every entry for the movie. Succeeds when there were none.
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
) -> Result<StatusCode> {
    validate_imdb_id(&imdb_id)?;

    let removed = state.catalog.delete_entries(&imdb_id);
    info!(imdb_id = %imdb_id, removed, "Entries deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /check/:imdb
///
/// Reports whether the movie is saved in the catalog. Never calls the source.
pub async fn check_handler(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
) -> Result<Json<CheckResponse>> {
    validate_imdb_id(&imdb_id)?;

    let exists = state.catalog.contains(&imdb_id);
    Ok(Json(CheckResponse { imdb_id, exists }))
}

/// Handler for GET /stats
///
/// Returns current cache and rate limiter statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.movies.stats();
    Json(StatsResponse::new(&stats, state.limiter.len()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
