use displaydoc::Display;
use thiserror::Error;

use crate::catalog::category::Category;
use crate::catalog::movie::Movie;

pub mod cache_store;
pub(crate) mod category_sql;
pub(crate) mod converters;
pub mod drive_store;
pub(crate) mod movie_sql;
pub(crate) mod record;

#[cfg(test)]
mod tests;

#[derive(Debug, Error, Display)]
pub enum Error {
    /// rusqlite: {0}
    Rusqlite(#[from] rusqlite::Error),
    /// io: {0}
    Io(#[from] std::io::Error),
    /// walkdir: {0}
    Walkdir(#[from] walkdir::Error),
    /// no category index present
    MissingCategoryIndex,
    /// category not present in cache: {0}
    UnknownCategory(String),
}

/// Common surface of the two catalog stores. Read failures are expected
/// conditions (missing directory, absent index) and are mapped by callers
/// to empty or fallback results rather than aborting a catalog load.
pub trait Store {
    fn list_categories(&mut self) -> Result<Vec<Category>, Error>;

    fn save_categories(&mut self, categories: &[Category]) -> Result<(), Error>;

    /// List the movies of a category with their metadata loaded, in the
    /// store's natural order.
    fn list_movies(&mut self, category: &Category) -> Result<Vec<Movie>, Error>;

    /// Load the metadata record for a movie in place. Returns false when the
    /// store has no record for it (the movie keeps its defaults).
    fn load_movie(&mut self, category: &Category, movie: &mut Movie) -> Result<bool, Error>;

    fn save_movie(&mut self, category: &Category, movie: &Movie) -> Result<(), Error>;
}

/// Extra surface of the cache store. Existence is defined by the drive, so
/// deletion only ever targets the mirror; the drive store deliberately has
/// no delete operations.
pub trait MirrorStore: Store {
    fn insert_category(&mut self, category: &Category) -> Result<(), Error>;

    fn rename_category(&mut self, path: &str, name: &str) -> Result<(), Error>;

    /// Delete a category and all movie rows under it as one atomic unit.
    fn delete_category(&mut self, path: &str) -> Result<(), Error>;

    fn delete_movie(&mut self, category: &Category, movie: &Movie) -> Result<(), Error>;

    /// Drop every cached row for this drive.
    fn clear(&mut self) -> Result<(), Error>;
}
