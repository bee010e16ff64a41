//! Movie metadata as returned by the OMDb API.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Movie record in OMDb's JSON shape.
///
/// OMDb reports lookups that found nothing with `"Response": "False"` and an
/// `Error` message instead of an HTTP error status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Movie {
    pub title: String,
    pub year: String,
    pub rated: String,
    pub released: String,
    pub runtime: String,
    pub genre: String,
    pub director: String,
    pub writer: String,
    pub actors: String,
    pub plot: String,
    pub language: String,
    pub country: String,
    pub awards: String,
    pub poster: String,
    #[serde(rename = "imdbRating", skip_serializing_if = "String::is_empty")]
    pub imdb_rating: String,
    #[serde(rename = "imdbVotes", skip_serializing_if = "String::is_empty")]
    pub imdb_votes: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Movie {
    /// True when OMDb reported a successful lookup.
    pub fn is_found(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }
}

/// Checks that `id` looks like an IMDb title id: `tt` followed by 7 or 8 digits.
pub fn validate_imdb_id(id: &str) -> Result<()> {
    let valid = id
        .strip_prefix("tt")
        .map(|digits| {
            (7..=8).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
        })
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(ApiError::InvalidRequest(format!(
            "'{}' is not a valid IMDb id",
            id
        )))
    }
}
