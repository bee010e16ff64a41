//! Catalog Module
//!
//! Saved movies and the watch-list entries users attach to them. Film lookups
//! consult this store after the cache and before OMDb.

mod entry;
mod store;

pub use entry::Entry;
pub use store::CatalogStore;
