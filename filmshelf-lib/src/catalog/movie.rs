use blake3::Hash;
use chrono::{DateTime, Utc};

use super::enrich::MovieFields;

/// File extensions that mark a folder as containing a movie.
pub const VIDEO_EXTENSIONS: &[&str] = &["avi", "mpeg", "mpg", "mkv"];

/// The metadata record attached to a movie.
///
/// `moddate` is the conflict resolution key during reconciliation: the copy
/// with the larger timestamp wins. Everything else is plain catalog data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieInfo {
    pub title: String,
    pub external_id: String,
    pub year: String,
    rating: u8,
    pub genres: Vec<String>,
    pub overview: String,
    pub directors: Vec<String>,
    pub actors: Vec<String>,
    pub image: Option<Vec<u8>>,
    pub moddate: DateTime<Utc>,
}

impl MovieInfo {
    /// The rating of the movie, between 1 and 10, or 0 when unset.
    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// Set the rating. Values outside 1..=10 leave the prior value in place.
    pub fn set_rating(&mut self, rating: i64) {
        if (1..=10).contains(&rating) {
            self.rating = rating as u8;
        }
    }

    /// Apply a field dictionary coming from a metadata source. Only fields
    /// present in the dictionary are touched; the rating goes through the
    /// domain-checked setter.
    pub fn apply(&mut self, fields: &MovieFields) {
        if let Some(title) = &fields.title {
            self.title = title.clone();
        }
        if let Some(external_id) = &fields.external_id {
            self.external_id = external_id.clone();
        }
        if let Some(year) = &fields.year {
            self.year = year.clone();
        }
        if let Some(rating) = fields.rating {
            self.set_rating(rating);
        }
        if let Some(genres) = &fields.genres {
            self.genres = genres.clone();
        }
        if let Some(overview) = &fields.overview {
            self.overview = overview.clone();
        }
        if let Some(directors) = &fields.directors {
            self.directors = directors.clone();
        }
        if let Some(actors) = &fields.actors {
            self.actors = actors.clone();
        }
        if let Some(image) = &fields.image {
            self.image = Some(image.clone());
        }
    }

    /// Fingerprint of the record content, excluding `moddate`. List fields
    /// hash order-insensitively since their order carries no meaning.
    pub fn fingerprint(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        for field in [&self.title, &self.external_id, &self.year, &self.overview] {
            hasher.update(field.as_bytes());
            hasher.update(&[0]);
        }
        hasher.update(&[self.rating]);
        for list in [&self.genres, &self.directors, &self.actors] {
            let mut sorted = list.clone();
            sorted.sort_unstable();
            for item in &sorted {
                hasher.update(item.as_bytes());
                hasher.update(&[0]);
            }
            hasher.update(&[1]);
        }
        if let Some(image) = &self.image {
            hasher.update(image);
        }
        hasher.finalize()
    }
}

/// A movie discovered in a category folder. Identity is the directory path
/// relative to the category root; the display name is derived from it once
/// at discovery and never changes.
#[derive(Debug, Clone)]
pub struct Movie {
    name: String,
    path: String,
    pub info: MovieInfo,
    persisted: Option<Hash>,
}

impl Movie {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            info: MovieInfo::default(),
            persisted: None,
        }
    }

    /// Display name derived from the folder path at discovery time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the movie directory relative to its category root. This is
    /// the durable half of the movie's identity (the category is the other).
    pub fn relative_path(&self) -> &str {
        &self.path
    }

    /// Record the current content as what the stores hold, so a later
    /// save can be skipped when nothing changed.
    pub fn mark_persisted(&mut self) {
        self.persisted = Some(self.info.fingerprint());
    }

    /// True when the in-memory record differs from what was last persisted.
    pub fn needs_save(&self) -> bool {
        match self.persisted {
            Some(hash) => hash != self.info.fingerprint(),
            None => true,
        }
    }
}
