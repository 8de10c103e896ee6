use std::path::Path;

use rusqlite::Connection;
use slog::{debug, Logger};

use super::category_sql::CategorySql;
use super::movie_sql::MovieSql;
use super::{Error, MirrorStore, Store};
use crate::catalog::category::Category;
use crate::catalog::movie::Movie;

/// Store backed by the local SQLite database that mirrors one drive's
/// catalog, keyed by the drive UUID (one database file per drive).
pub struct CacheStore {
    conn: Connection,
    logger: Logger,
}

impl CacheStore {
    /// Open (or create) the cache database. Failure here is the one hard
    /// error of the catalog: with the cache gone there is no fallback store.
    pub fn open(path: &Path, logger: &Logger) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        Self::new_impl(conn, logger)
    }

    pub fn open_in_memory(logger: &Logger) -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        Self::new_impl(conn, logger)
    }

    fn new_impl(conn: Connection, logger: &Logger) -> Result<Self, Error> {
        CategorySql::create_table(&conn)?;
        MovieSql::create_table(&conn)?;
        Ok(Self {
            conn,
            logger: logger.clone(),
        })
    }

    fn category_id(&self, category: &Category) -> Result<i64, Error> {
        CategorySql::id_for_path(&self.conn, &category.path)?
            .ok_or_else(|| Error::UnknownCategory(category.path.clone()))
    }

    fn row_from_movie(cat: i64, movie: &Movie) -> MovieSql {
        MovieSql {
            cat,
            name: movie.name().to_owned(),
            path: movie.relative_path().to_owned(),
            image: movie.info.image.clone(),
            title: movie.info.title.clone(),
            external_id: movie.info.external_id.clone(),
            year: movie.info.year.clone(),
            rating: i64::from(movie.info.rating()),
            genres: movie.info.genres.clone().into(),
            overview: movie.info.overview.clone(),
            directors: movie.info.directors.clone().into(),
            actors: movie.info.actors.clone().into(),
            moddate: movie.info.moddate.into(),
        }
    }

    fn movie_from_row(row: MovieSql) -> Movie {
        let mut movie = Movie::new(row.name, row.path);
        movie.info.title = row.title;
        movie.info.external_id = row.external_id;
        movie.info.year = row.year;
        movie.info.set_rating(row.rating);
        movie.info.genres = row.genres.into();
        movie.info.overview = row.overview;
        movie.info.directors = row.directors.into();
        movie.info.actors = row.actors.into();
        movie.info.image = row.image;
        movie.info.moddate = row.moddate.into();
        movie.mark_persisted();
        movie
    }
}

impl Store for CacheStore {
    fn list_categories(&mut self) -> Result<Vec<Category>, Error> {
        let categories = CategorySql::get_rows(&self.conn)?
            .into_iter()
            .map(|row| Category::new(row.name, row.path))
            .collect::<Vec<_>>();
        debug!(self.logger, "read categories from cache"; "count" => categories.len());
        Ok(categories)
    }

    /// Bring the cached category set in line with the given one: update
    /// names of kept categories, drop the rest with their movie rows, insert
    /// the new ones. Runs as one transaction.
    fn save_categories(&mut self, categories: &[Category]) -> Result<(), Error> {
        let tx = self.conn.transaction()?;
        let existing = CategorySql::get_rows(&tx)?;
        let mut to_insert: Vec<&Category> = categories.iter().collect();
        for row in existing {
            match to_insert.iter().position(|c| c.path == row.path) {
                Some(i) => {
                    let category = to_insert.remove(i);
                    if category.name != row.name {
                        CategorySql::update_name(&tx, &category.path, &category.name)?;
                    }
                }
                None => {
                    if let Some(id) = CategorySql::id_for_path(&tx, &row.path)? {
                        tx.execute("DELETE FROM movies WHERE cat = ?1", [id])?;
                        tx.execute("DELETE FROM categories WHERE id = ?1", [id])?;
                    }
                }
            }
        }
        for category in to_insert {
            CategorySql {
                name: category.name.clone(),
                path: category.path.clone(),
            }
            .insert(&tx)?;
        }
        tx.commit()?;
        debug!(self.logger, "wrote categories to cache"; "count" => categories.len());
        Ok(())
    }

    fn list_movies(&mut self, category: &Category) -> Result<Vec<Movie>, Error> {
        let Some(id) = CategorySql::id_for_path(&self.conn, &category.path)? else {
            return Ok(Vec::new());
        };
        let movies = MovieSql::rows_for_category(&self.conn, id)?
            .into_iter()
            .map(Self::movie_from_row)
            .collect::<Vec<_>>();
        debug!(self.logger, "read movies from cache";
               "category" => &category.name, "count" => movies.len());
        Ok(movies)
    }

    fn load_movie(&mut self, category: &Category, movie: &mut Movie) -> Result<bool, Error> {
        let Some(id) = CategorySql::id_for_path(&self.conn, &category.path)? else {
            return Ok(false);
        };
        match MovieSql::find(&self.conn, id, movie.relative_path())? {
            Some(row) => {
                *movie = Self::movie_from_row(row);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn save_movie(&mut self, category: &Category, movie: &Movie) -> Result<(), Error> {
        let id = self.category_id(category)?;
        let row = Self::row_from_movie(id, movie);
        if MovieSql::find(&self.conn, id, movie.relative_path())?.is_some() {
            row.update(&self.conn)?;
        } else {
            row.insert(&self.conn)?;
        }
        debug!(self.logger, "wrote movie to cache"; "movie" => movie.name());
        Ok(())
    }
}

impl MirrorStore for CacheStore {
    fn insert_category(&mut self, category: &Category) -> Result<(), Error> {
        CategorySql {
            name: category.name.clone(),
            path: category.path.clone(),
        }
        .insert(&self.conn)?;
        Ok(())
    }

    fn rename_category(&mut self, path: &str, name: &str) -> Result<(), Error> {
        CategorySql::update_name(&self.conn, path, name)?;
        Ok(())
    }

    fn delete_category(&mut self, path: &str) -> Result<(), Error> {
        let tx = self.conn.transaction()?;
        if let Some(id) = CategorySql::id_for_path(&tx, path)? {
            tx.execute("DELETE FROM movies WHERE cat = ?1", [id])?;
            tx.execute("DELETE FROM categories WHERE id = ?1", [id])?;
        }
        tx.commit()?;
        debug!(self.logger, "deleted category from cache"; "path" => path);
        Ok(())
    }

    fn delete_movie(&mut self, category: &Category, movie: &Movie) -> Result<(), Error> {
        let id = self.category_id(category)?;
        MovieSql::delete(&self.conn, id, movie.relative_path())?;
        debug!(self.logger, "deleted movie from cache"; "movie" => movie.name());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Error> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM movies", [])?;
        tx.execute("DELETE FROM categories", [])?;
        tx.commit()?;
        Ok(())
    }
}
