use std::path::Path;

use chrono::Utc;
use displaydoc::Display;
use slog::{debug, info, warn, Logger};
use thiserror::Error;

use crate::store::cache_store::CacheStore;
use crate::store::drive_store::DriveStore;
use crate::store::{MirrorStore, Store};

use self::category::Category;
use self::drive::Drive;
use self::enrich::MovieFields;
use self::movie::Movie;
use self::sync::Reconciler;

pub mod category;
pub mod drive;
pub mod enrich;
pub mod filter;
pub mod movie;
pub mod registry;
pub mod sync;


#[derive(Debug, Error, Display)]
pub enum Error {
    /// store: {0}
    Store(#[from] crate::store::Error),
}

/// Drive-level entry point for the rest of the application. Callers ask for
/// categories and movies and never learn which store answered: with the
/// drive connected the reconciliation engine merges both stores, without it
/// the cache serves its last known state read-only.
pub struct Catalog {
    drive: Drive,
    source: DriveStore,
    cache: CacheStore,
    logger: Logger,
}

impl Catalog {
    /// Open the catalog for a drive, with the cache database at the given
    /// path. A cache that cannot be opened is the one hard failure here.
    pub fn open(drive: Drive, cache_db: &Path, logger: &Logger) -> Result<Self, Error> {
        let source = DriveStore::new(drive.path(), logger);
        let cache = CacheStore::open(cache_db, logger)?;
        Ok(Self {
            drive,
            source,
            cache,
            logger: logger.clone(),
        })
    }

    #[cfg(test)]
    fn with_stores(drive: Drive, source: DriveStore, cache: CacheStore, logger: &Logger) -> Self {
        Self {
            drive,
            source,
            cache,
            logger: logger.clone(),
        }
    }

    pub fn drive(&self) -> &Drive {
        &self.drive
    }

    pub fn categories(&mut self) -> Vec<Category> {
        if self.drive.is_connected() {
            Reconciler::new(&mut self.source, &mut self.cache, &self.logger).categories()
        } else {
            info!(self.logger, "drive disconnected, serving cached categories";
                  "drive" => &self.drive.label);
            self.cache.list_categories().unwrap_or_else(|e| {
                warn!(self.logger, "failed to read cached categories"; "error" => %e);
                Vec::new()
            })
        }
    }

    pub fn movies(&mut self, category: &Category) -> Vec<Movie> {
        if self.drive.is_connected() {
            // Categories first, so the cache is guaranteed to hold the row
            // the movie writes hang off.
            let mut reconciler = Reconciler::new(&mut self.source, &mut self.cache, &self.logger);
            reconciler.categories();
            reconciler.movies(category)
        } else {
            info!(self.logger, "drive disconnected, serving cached movies";
                  "drive" => &self.drive.label, "category" => &category.name);
            self.cache.list_movies(category).unwrap_or_else(|e| {
                warn!(self.logger, "failed to read cached movies"; "error" => %e);
                Vec::new()
            })
        }
    }

    /// Persist edits to a movie's metadata. A save with unchanged content is
    /// a no-op; otherwise the record is stamped with the current time and
    /// written to both stores, each on a best-effort basis.
    pub fn save_movie(&mut self, category: &Category, movie: &mut Movie) {
        if !movie.needs_save() {
            debug!(self.logger, "movie unchanged, skipping save"; "movie" => movie.name());
            return;
        }
        movie.info.moddate = Utc::now();
        self.write_through(category, movie);
    }

    /// Persist the category structure to both stores.
    pub fn save_categories(&mut self, categories: &[Category]) {
        if self.drive.is_connected() {
            if let Err(e) = self.source.save_categories(categories) {
                warn!(self.logger, "failed to write category index to drive"; "error" => %e);
            }
        }
        if let Err(e) = self.cache.save_categories(categories) {
            warn!(self.logger, "failed to write categories to cache"; "error" => %e);
        }
    }

    /// Apply a field dictionary from a metadata source. Enrichment always
    /// counts as newer: the record is re-stamped and persisted even when the
    /// fields happen to match what was already there.
    pub fn apply_enrichment(
        &mut self,
        category: &Category,
        movie: &mut Movie,
        fields: &MovieFields,
    ) {
        movie.info.apply(fields);
        movie.info.moddate = Utc::now();
        self.write_through(category, movie);
    }

    /// Wipe every record this application keeps for the drive, on the drive
    /// itself and in the cache.
    pub fn clean_all(&mut self) {
        if self.drive.is_connected() {
            if let Err(e) = self.source.clean_all() {
                warn!(self.logger, "failed to clean drive records"; "error" => %e);
            }
        }
        if let Err(e) = self.cache.clear() {
            warn!(self.logger, "failed to clear cache"; "error" => %e);
        }
    }

    fn write_through(&mut self, category: &Category, movie: &mut Movie) {
        if self.drive.is_connected() {
            if let Err(e) = self.source.save_movie(category, movie) {
                warn!(self.logger, "failed to write movie to drive";
                      "movie" => movie.name(), "error" => %e);
            }
        }
        if let Err(e) = self.cache.save_movie(category, movie) {
            warn!(self.logger, "failed to write movie to cache";
                  "movie" => movie.name(), "error" => %e);
        }
        movie.mark_persisted();
    }
}
