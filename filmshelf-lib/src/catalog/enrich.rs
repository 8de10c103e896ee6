use displaydoc::Display;
use thiserror::Error;

#[derive(Debug, Error, Display)]
pub enum Error {
    /// metadata lookup failed: {0}
    Lookup(String),
}

/// A field dictionary produced by a metadata source. Fields left as `None`
/// are not touched when the dictionary is applied to a movie.
#[derive(Debug, Clone, Default)]
pub struct MovieFields {
    pub title: Option<String>,
    pub external_id: Option<String>,
    pub year: Option<String>,
    pub rating: Option<i64>,
    pub genres: Option<Vec<String>>,
    pub overview: Option<String>,
    pub directors: Option<Vec<String>>,
    pub actors: Option<Vec<String>>,
    pub image: Option<Vec<u8>>,
}

/// External catalog of movie metadata. The catalog consumes its output as
/// an ordinary metadata write with no special merge treatment; see
/// [`crate::catalog::Catalog::apply_enrichment`].
pub trait MetadataSource {
    /// Search by title or folder name.
    fn search(&self, query: &str) -> Result<Vec<MovieFields>, Error>;

    /// Look up a single entry by its identifier in this source.
    fn by_id(&self, id: &str) -> Result<Option<MovieFields>, Error>;
}
