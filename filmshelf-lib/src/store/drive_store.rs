use std::fs;
use std::path::{Path, PathBuf};

use slog::{debug, warn, Logger};
use walkdir::WalkDir;

use super::record;
use super::{Error, Store};
use crate::catalog::category::Category;
use crate::catalog::movie::{Movie, VIDEO_EXTENSIONS};

/// Name of the hidden folder holding the app's records, both at the drive
/// root (category index) and inside each movie directory (info record).
pub const APP_DIR: &str = ".filmshelf";

const CATEGORY_INDEX: &str = "categories.ini";
const INFO_FILE: &str = "info.ini";
const COVER_FILE: &str = "cover.jpg";

/// Store backed by the drive's physical directory tree. Authoritative for
/// which categories and movies exist.
pub struct DriveStore {
    root: PathBuf,
    logger: Logger,
}

impl DriveStore {
    pub fn new(root: impl Into<PathBuf>, logger: &Logger) -> Self {
        Self {
            root: root.into(),
            logger: logger.clone(),
        }
    }

    /// Remove every record folder this store has written under the drive
    /// root, leaving the movies themselves untouched.
    pub fn clean_all(&mut self) -> Result<(), Error> {
        let mut app_dirs = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry?;
            if entry.file_type().is_dir() && entry.file_name() == APP_DIR {
                app_dirs.push(entry.into_path());
            }
        }
        for dir in app_dirs {
            debug!(self.logger, "removing record folder"; "path" => %dir.display());
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }

    fn category_index_path(&self) -> PathBuf {
        self.root.join(APP_DIR).join(CATEGORY_INDEX)
    }

    fn info_dir(&self, category: &Category, movie: &Movie) -> PathBuf {
        category
            .full_path(&self.root)
            .join(movie.relative_path())
            .join(APP_DIR)
    }
}

impl Store for DriveStore {
    fn list_categories(&mut self) -> Result<Vec<Category>, Error> {
        let index_path = self.category_index_path();
        if !index_path.exists() {
            debug!(self.logger, "no category index on drive"; "path" => %index_path.display());
            return Err(Error::MissingCategoryIndex);
        }
        let text = fs::read_to_string(&index_path)?;
        let categories = record::parse_categories(&text);
        debug!(self.logger, "loaded categories from drive"; "count" => categories.len());
        Ok(categories)
    }

    fn save_categories(&mut self, categories: &[Category]) -> Result<(), Error> {
        let app_dir = self.root.join(APP_DIR);
        fs::create_dir_all(&app_dir)?;
        fs::write(self.category_index_path(), record::serialize_categories(categories))?;
        debug!(self.logger, "wrote category index to drive"; "count" => categories.len());
        Ok(())
    }

    fn list_movies(&mut self, category: &Category) -> Result<Vec<Movie>, Error> {
        let category_path = category.full_path(&self.root);
        let mut movies = Vec::new();
        if !category_path.is_dir() {
            debug!(self.logger, "category folder absent";
                   "category" => &category.name, "path" => %category_path.display());
            return Ok(movies);
        }

        let walker = WalkDir::new(&category_path)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != APP_DIR);
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(self.logger, "skipping unreadable entry during scan"; "error" => %e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() || !directory_has_video(entry.path()) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&category_path)
                .unwrap_or(entry.path());
            let relative = if relative.as_os_str().is_empty() {
                ".".to_owned()
            } else {
                relative.to_string_lossy().into_owned()
            };
            let name = relative.replace(['/', '\\'], " ");
            let mut movie = Movie::new(name, relative);
            if let Err(e) = self.load_movie(category, &mut movie) {
                warn!(self.logger, "failed to load movie info, keeping defaults";
                      "movie" => movie.name(), "error" => %e);
            }
            movies.push(movie);
        }
        debug!(self.logger, "scanned movies from drive";
               "category" => &category.name, "count" => movies.len());
        Ok(movies)
    }

    fn load_movie(&mut self, category: &Category, movie: &mut Movie) -> Result<bool, Error> {
        let info_dir = self.info_dir(category, movie);
        let info_path = info_dir.join(INFO_FILE);
        if !info_path.exists() {
            movie.mark_persisted();
            return Ok(false);
        }
        let text = fs::read_to_string(&info_path)?;
        movie.info = record::parse_info(&text, &self.logger);

        let cover_path = info_dir.join(COVER_FILE);
        if cover_path.exists() {
            match fs::read(&cover_path) {
                Ok(bytes) => movie.info.image = Some(bytes),
                Err(e) => {
                    warn!(self.logger, "failed to read cover image";
                          "movie" => movie.name(), "error" => %e);
                }
            }
        }
        movie.mark_persisted();
        Ok(true)
    }

    fn save_movie(&mut self, category: &Category, movie: &Movie) -> Result<(), Error> {
        let info_dir = self.info_dir(category, movie);
        fs::create_dir_all(&info_dir)?;
        fs::write(info_dir.join(INFO_FILE), record::serialize_info(&movie.info))?;
        if let Some(image) = &movie.info.image {
            fs::write(info_dir.join(COVER_FILE), image)?;
        }
        debug!(self.logger, "wrote movie info to drive"; "movie" => movie.name());
        Ok(())
    }
}

fn directory_has_video(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if VIDEO_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()) {
            return true;
        }
    }
    false
}
