//! Watch-list entries attached to a movie.

use serde::{Deserialize, Serialize};

/// A user's note about a movie: who, whether they have watched it, and a
/// free-form comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Assigned by the store; 0 until the entry is saved
    pub id: u64,
    pub name: String,
    pub watched: bool,
    pub comment: String,
}

impl Entry {
    /// Creates an unsaved entry.
    pub fn new(name: impl Into<String>, watched: bool, comment: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            watched,
            comment: comment.into(),
        }
    }
}
