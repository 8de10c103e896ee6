use std::collections::HashMap;

use slog::{debug, info, warn, Logger};

use super::category::Category;
use super::movie::Movie;
use crate::store::{MirrorStore, Store};

/// The reconciliation engine: merges the drive's view of the catalog (the
/// source, authoritative for existence) with the local cache (a mirror that
/// answers when the drive is absent), issuing the minimal writes to bring
/// the store that is behind up to date. Holds no state across calls.
pub struct Reconciler<'a, S, M> {
    source: &'a mut S,
    mirror: &'a mut M,
    logger: Logger,
}

impl<'a, S: Store, M: MirrorStore> Reconciler<'a, S, M> {
    pub fn new(source: &'a mut S, mirror: &'a mut M, logger: &Logger) -> Self {
        Self {
            source,
            mirror,
            logger: logger.clone(),
        }
    }

    /// Reconcile the category sets and return the current one.
    ///
    /// The source list is the result whenever it can be read at all: the
    /// drive defines the category structure, and the cache is updated to
    /// match it as a side effect. When the source is unreadable (drive
    /// missing, no index yet) the cached list is returned unchanged — no
    /// destructive sync is ever attempted against an absent source.
    pub fn categories(&mut self) -> Vec<Category> {
        let source_list = match self.source.list_categories() {
            Ok(list) => list,
            Err(e) => {
                info!(self.logger, "source categories unavailable, serving cache"; "reason" => %e);
                return self.mirror.list_categories().unwrap_or_else(|e| {
                    warn!(self.logger, "failed to read cached categories"; "error" => %e);
                    Vec::new()
                });
            }
        };

        let cached = self.mirror.list_categories().unwrap_or_else(|e| {
            warn!(self.logger, "failed to read cached categories"; "error" => %e);
            Vec::new()
        });
        let mut stale: HashMap<&str, &Category> =
            cached.iter().map(|c| (c.path.as_str(), c)).collect();

        for category in &source_list {
            match stale.remove(category.path.as_str()) {
                Some(cached_category) => {
                    // Same identity in both stores; the drive's name wins.
                    if cached_category.name != category.name {
                        debug!(self.logger, "category renamed on drive";
                               "path" => &category.path, "name" => &category.name);
                        if let Err(e) = self.mirror.rename_category(&category.path, &category.name)
                        {
                            warn!(self.logger, "failed to rename cached category"; "error" => %e);
                        }
                    }
                }
                None => {
                    if let Err(e) = self.mirror.insert_category(category) {
                        warn!(self.logger, "failed to insert category into cache"; "error" => %e);
                    }
                }
            }
        }

        // Whatever was not matched no longer exists on the drive; drop it
        // from the cache together with its movie rows.
        for category in stale.into_values() {
            debug!(self.logger, "category gone from drive, purging cache"; "path" => &category.path);
            if let Err(e) = self.mirror.delete_category(&category.path) {
                warn!(self.logger, "failed to delete cached category"; "error" => %e);
            }
        }

        source_list
    }

    /// Reconcile one category's movies and return the merged list, in
    /// drive-scan order.
    ///
    /// Movies present in both stores resolve by modification date: the
    /// larger timestamp wins and the losing store is rewritten with the
    /// winning record. Movies only on the drive are inserted into the
    /// cache; movies only in the cache no longer exist and are deleted from
    /// it, never surfaced. Write-back failures are logged and do not abort
    /// the merge — the returned list still reflects the winning copies.
    pub fn movies(&mut self, category: &Category) -> Vec<Movie> {
        let scanned = match self.source.list_movies(category) {
            Ok(list) => list,
            Err(e) => {
                warn!(self.logger, "failed to scan movies from drive";
                      "category" => &category.name, "error" => %e);
                Vec::new()
            }
        };
        let mut cached = self.mirror.list_movies(category).unwrap_or_else(|e| {
            warn!(self.logger, "failed to read cached movies"; "error" => %e);
            Vec::new()
        });

        let mut merged = Vec::with_capacity(scanned.len());
        for movie in scanned {
            let matched = cached
                .iter()
                .position(|m| m.relative_path() == movie.relative_path());
            match matched {
                Some(i) => {
                    let cached_movie = cached.remove(i);
                    if cached_movie.info.moddate > movie.info.moddate {
                        // Cached record is newer; the drive catches up now.
                        if let Err(e) = self.source.save_movie(category, &cached_movie) {
                            warn!(self.logger, "failed to write movie back to drive";
                                  "movie" => cached_movie.name(), "error" => %e);
                        }
                        merged.push(cached_movie);
                    } else if movie.info.moddate > cached_movie.info.moddate {
                        // Drive record is newer; the cache catches up now.
                        if let Err(e) = self.mirror.save_movie(category, &movie) {
                            warn!(self.logger, "failed to write movie to cache";
                                  "movie" => movie.name(), "error" => %e);
                        }
                        merged.push(movie);
                    } else {
                        merged.push(cached_movie);
                    }
                }
                None => {
                    // New on the drive; the cache learns about it now.
                    if let Err(e) = self.mirror.save_movie(category, &movie) {
                        warn!(self.logger, "failed to insert movie into cache";
                              "movie" => movie.name(), "error" => %e);
                    }
                    merged.push(movie);
                }
            }
        }

        // Matches were removed as they were found, so what remains in the
        // cached list no longer exists on the drive.
        for movie in cached {
            debug!(self.logger, "movie gone from drive, purging cache row"; "movie" => movie.name());
            if let Err(e) = self.mirror.delete_movie(category, &movie) {
                warn!(self.logger, "failed to delete cached movie"; "error" => %e);
            }
        }

        merged
    }
}
