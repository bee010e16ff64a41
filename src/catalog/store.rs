//! Catalog Store Module
//!
//! In-memory record of saved movies and the watch-list entries written about
//! them, keyed by IMDb id. Saving the first entry for a title also saves the
//! movie, so later lookups can be served without asking OMDb.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::catalog::Entry;
use crate::media::Movie;

struct Record {
    movie: Arc<Movie>,
    entries: Vec<Entry>,
}

// == Catalog Store ==
/// Thread-safe store of movies and their watch-list entries.
pub struct CatalogStore {
    records: RwLock<HashMap<String, Record>>,
    next_id: AtomicU64,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    // == Movies ==
    /// Returns the saved movie for `imdb_id`, if any.
    pub fn movie(&self, imdb_id: &str) -> Option<Arc<Movie>> {
        self.records
            .read()
            .get(imdb_id)
            .map(|record| record.movie.clone())
    }

    /// True when the movie has been saved.
    pub fn contains(&self, imdb_id: &str) -> bool {
        self.records.read().contains_key(imdb_id)
    }

    /// Saves `movie` without entries. An already saved movie is kept as is.
    ///
    /// Returns true when the movie was not saved before.
    pub fn save_movie(&self, movie: Arc<Movie>) -> bool {
        let mut records = self.records.write();
        if records.contains_key(&movie.imdb_id) {
            return false;
        }
        records.insert(
            movie.imdb_id.clone(),
            Record {
                movie,
                entries: Vec::new(),
            },
        );
        true
    }

    // == Entries ==
    /// Saves `entry` under `movie`, saving the movie first if needed, and
    /// returns the entry with its assigned id.
    pub fn create_entry(&self, movie: Arc<Movie>, mut entry: Entry) -> Entry {
        entry.id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut records = self.records.write();
        records
            .entry(movie.imdb_id.clone())
            .or_insert_with(|| Record {
                movie,
                entries: Vec::new(),
            })
            .entries
            .push(entry.clone());

        entry
    }

    /// All entries for `imdb_id`, oldest first.
    pub fn entries(&self, imdb_id: &str) -> Vec<Entry> {
        self.records
            .read()
            .get(imdb_id)
            .map(|record| record.entries.clone())
            .unwrap_or_default()
    }

    /// Overwrites name, watched flag and comment of every entry for
    /// `imdb_id` and returns the updated entries. Ids are kept.
    ///
    /// Returns an empty list when the movie has no entries.
    pub fn update_entries(
        &self,
        imdb_id: &str,
        name: &str,
        watched: bool,
        comment: &str,
    ) -> Vec<Entry> {
        let mut records = self.records.write();
        let Some(record) = records.get_mut(imdb_id) else {
            return Vec::new();
        };

        for entry in &mut record.entries {
            entry.name = name.to_string();
            entry.watched = watched;
            entry.comment = comment.to_string();
        }
        record.entries.clone()
    }

    /// Removes every entry for `imdb_id` and returns how many were removed.
    /// The saved movie stays.
    pub fn delete_entries(&self, imdb_id: &str) -> usize {
        self.records
            .write()
            .get_mut(imdb_id)
            .map(|record| std::mem::take(&mut record.entries).len())
            .unwrap_or(0)
    }

    /// Number of saved movies.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}
