//! API Module
//!
//! HTTP handlers, middleware and routing for the catalog REST API.
//!
//! # Endpoints
//! - `GET /films/:imdb` - Look up a movie by IMDb id
//! - `POST /films/:imdb` - Save a movie to the catalog
//! - `DELETE /films/:imdb` - Drop a movie from the cache
//! - `POST|PUT|DELETE /films/:imdb/entry` - Manage watch-list entries
//! - `GET /check/:imdb` - Whether a movie is saved in the catalog
//! - `GET /stats` - Get cache and rate limiter statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

pub use handlers::*;
pub use routes::create_router;
