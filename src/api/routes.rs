//! API Routes
//!
//! Configures the Axum router with all catalog endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    check_handler, create_entry_handler, delete_entry_handler, evict_film_handler, film_handler,
    health_handler, save_film_handler, stats_handler, update_entry_handler, AppState,
};
use super::middleware::rate_limit;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /films/:imdb` - Look up a movie (cache, then catalog, then OMDb)
/// - `POST /films/:imdb` - Save a movie to the catalog
/// - `DELETE /films/:imdb` - Drop a movie from the cache
/// - `POST /films/:imdb/entry` - Add a watch-list entry
/// - `PUT /films/:imdb/entry` - Update a movie's entries
/// - `DELETE /films/:imdb/entry` - Remove a movie's entries
/// - `GET /check/:imdb` - Whether a movie is saved in the catalog
/// - `GET /stats` - Cache and rate limiter statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Rate limiting: per client, on everything except `/health`
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let throttled = Router::new()
        .route(
            "/films/:imdb",
            get(film_handler)
                .post(save_film_handler)
                .delete(evict_film_handler),
        )
        .route(
            "/films/:imdb/entry",
            post(create_entry_handler)
                .put(update_entry_handler)
                .delete(delete_entry_handler),
        )
        .route("/check/:imdb", get(check_handler))
        .route("/stats", get(stats_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .merge(throttled)
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
