//! Request DTOs for the catalog API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::catalog::Entry;

const MAX_NAME_LEN: usize = 64;
const MAX_COMMENT_LEN: usize = 1024;

/// Request body for writing a watch-list entry
/// (POST and PUT /films/:imdb/entry)
///
/// # Fields
/// - `name`: Who the entry belongs to
/// - `watched`: Whether they have seen the movie (default false)
/// - `comment`: Free-form note (default empty)
#[derive(Debug, Clone, Deserialize)]
pub struct EntryRequest {
    pub name: String,
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub comment: String,
}

impl EntryRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Name cannot be empty".to_string());
        }
        if self.name.len() > MAX_NAME_LEN {
            return Some(format!(
                "Name exceeds maximum length of {} characters",
                MAX_NAME_LEN
            ));
        }
        if self.comment.len() > MAX_COMMENT_LEN {
            return Some(format!(
                "Comment exceeds maximum length of {} characters",
                MAX_COMMENT_LEN
            ));
        }
        None
    }

    /// Unsaved entry carrying this request's fields.
    pub fn into_entry(self) -> Entry {
        Entry::new(self.name, self.watched, self.comment)
    }
}
