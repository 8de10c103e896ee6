//! Line-oriented key/value codec for the records kept on the drive itself:
//! the per-drive category index and the per-movie info file.

use chrono::{DateTime, TimeZone, Utc};
use slog::{debug, Logger};

use crate::catalog::category::Category;
use crate::catalog::movie::MovieInfo;

/// Joins list-valued fields on disk and in the cache database. Reserved:
/// not expected to occur in titles, names or genres.
pub const LIST_SEPARATOR: &str = "||";

const INFO_SECTION: &str = "[info]";

pub(crate) fn serialize_categories(categories: &[Category]) -> String {
    let mut out = String::new();
    for category in categories {
        out.push('[');
        out.push_str(&escape(&category.name));
        out.push_str("]\n");
        out.push_str("path = ");
        out.push_str(&escape(&category.path));
        out.push('\n');
    }
    out
}

pub(crate) fn parse_categories(text: &str) -> Vec<Category> {
    let mut categories = Vec::new();
    let mut current: Option<String> = None;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current = Some(unescape(name));
        } else if let Some((key, value)) = line.split_once('=') {
            if key.trim() == "path" {
                if let Some(name) = current.take() {
                    categories.push(Category::new(name, unescape(value.trim())));
                }
            }
        }
    }
    categories
}

pub(crate) fn serialize_info(info: &MovieInfo) -> String {
    let mut out = String::from(INFO_SECTION);
    out.push('\n');
    let fields = [
        ("title", escape(&info.title)),
        ("externalid", escape(&info.external_id)),
        ("year", escape(&info.year)),
        ("rating", info.rating().to_string()),
        ("genres", escape(&info.genres.join(LIST_SEPARATOR))),
        ("overview", escape(&info.overview)),
        ("directors", escape(&info.directors.join(LIST_SEPARATOR))),
        ("actors", escape(&info.actors.join(LIST_SEPARATOR))),
        ("moddate", info.moddate.timestamp().to_string()),
    ];
    for (key, value) in fields {
        out.push_str(key);
        out.push_str(" = ");
        out.push_str(&value);
        out.push('\n');
    }
    out
}

/// Parse an info record. A field that does not parse is skipped and keeps
/// its default; the movie load itself never fails on bad content.
pub(crate) fn parse_info(text: &str, logger: &Logger) -> MovieInfo {
    let mut info = MovieInfo::default();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('[') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            debug!(logger, "skipping malformed info line"; "line" => line);
            continue;
        };
        let value = unescape(value.trim());
        match key.trim() {
            "title" => info.title = value,
            "externalid" => info.external_id = value,
            "year" => info.year = value,
            "rating" => match value.parse::<i64>() {
                Ok(rating) => info.set_rating(rating),
                Err(_) => debug!(logger, "skipping unparseable rating"; "value" => value),
            },
            "genres" => info.genres = split_list(&value),
            "overview" => info.overview = value,
            "directors" => info.directors = split_list(&value),
            "actors" => info.actors = split_list(&value),
            "moddate" => match parse_moddate(&value) {
                Some(moddate) => info.moddate = moddate,
                None => debug!(logger, "skipping unparseable moddate"; "value" => value),
            },
            other => debug!(logger, "skipping unknown info key"; "key" => other),
        }
    }
    info
}

pub(crate) fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        Vec::new()
    } else {
        value.split(LIST_SEPARATOR).map(str::to_owned).collect()
    }
}

fn parse_moddate(value: &str) -> Option<DateTime<Utc>> {
    // Stored as an integer epoch, but older records carry fractional
    // seconds, so accept a float and truncate.
    let seconds = value.parse::<f64>().ok()?;
    Utc.timestamp_opt(seconds as i64, 0).single()
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
