//! Metadata sources: where movie records come from on a cache miss.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::media::Movie;

// == Metadata Source Trait ==
/// Looks up movie metadata by IMDb id.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetches the movie with the given id.
    ///
    /// Returns `ApiError::NotFound` when the source has no such title.
    async fn movie_by_id(&self, imdb_id: &str) -> Result<Movie>;
}

// == OMDb Client ==
/// [`MetadataSource`] backed by the OMDb HTTP API.
#[derive(Debug, Clone)]
pub struct OmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    /// Creates a client for the OMDb endpoint at `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url, api_key)
    }

    /// Creates a client that sends requests through `http`.
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl MetadataSource for OmdbClient {
    async fn movie_by_id(&self, imdb_id: &str) -> Result<Movie> {
        debug!(imdb_id, "Fetching movie from OMDb");

        let movie: Movie = self
            .http
            .get(&self.base_url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("type", "movie"),
                ("i", imdb_id),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !movie.is_found() {
            return Err(match movie.error {
                Some(reason) if reason.to_ascii_lowercase().contains("api key") => {
                    ApiError::Upstream(reason)
                }
                _ => ApiError::NotFound(imdb_id.to_string()),
            });
        }

        Ok(movie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};

    const API_KEY: &str = "test-key";

    /// Answers like OMDb: always 200, failures reported in the body. Only a
    /// movie query with the right key for Heat finds anything.
    async fn omdb(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let param = |name: &'static str| params.get(name).map(String::as_str);

        if param("apikey") != Some(API_KEY) {
            return Json(json!({"Response": "False", "Error": "Invalid API key!"}));
        }

        match (param("type"), param("i")) {
            (Some("movie"), Some("tt0113277")) => Json(json!({
                "Title": "Heat",
                "Year": "1995",
                "Director": "Michael Mann",
                "imdbID": "tt0113277",
                "Type": "movie",
                "Response": "True"
            })),
            _ => Json(json!({"Response": "False", "Error": "Incorrect IMDb ID."})),
        }
    }

    /// Serves the fake OMDb on an ephemeral port and returns its base URL.
    async fn spawn_omdb() -> String {
        let app = Router::new()
            .route("/", get(omdb))
            .route("/down", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn client(url: String, api_key: &str) -> OmdbClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        OmdbClient::with_http_client(http, url, api_key)
    }

    #[tokio::test]
    async fn test_movie_by_id_found() {
        let base = spawn_omdb().await;

        let movie = client(format!("{}/", base), API_KEY)
            .movie_by_id("tt0113277")
            .await
            .unwrap();

        assert_eq!(movie.title, "Heat");
        assert_eq!(movie.director, "Michael Mann");
        assert!(movie.is_found());
    }

    #[tokio::test]
    async fn test_movie_by_id_not_found() {
        let base = spawn_omdb().await;

        let result = client(format!("{}/", base), API_KEY)
            .movie_by_id("tt7654321")
            .await;

        match result {
            Err(ApiError::NotFound(id)) => assert_eq!(id, "tt7654321"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_movie_by_id_bad_key_is_upstream_error() {
        let base = spawn_omdb().await;

        let result = client(format!("{}/", base), "wrong-key")
            .movie_by_id("tt0113277")
            .await;

        match result {
            Err(ApiError::Upstream(reason)) => assert!(reason.contains("API key")),
            other => panic!("expected Upstream, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_movie_by_id_http_error_is_upstream_error() {
        let base = spawn_omdb().await;

        let result = client(format!("{}/down", base), API_KEY)
            .movie_by_id("tt0113277")
            .await;

        assert!(matches!(result, Err(ApiError::Upstream(_))));
    }
}
