//! Media Module
//!
//! Movie metadata and the sources it is fetched from.

mod movie;
mod source;

pub use movie::{validate_imdb_id, Movie};
pub use source::{MetadataSource, OmdbClient};
