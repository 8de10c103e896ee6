use chrono::{TimeZone, Utc};
use slog::{o, Discard, Logger};

use super::cache_store::CacheStore;
use super::record;
use super::{MirrorStore, Store};
use crate::catalog::category::Category;
use crate::catalog::movie::{Movie, MovieInfo};

fn logger() -> Logger {
    Logger::root(Discard, o!())
}

fn sample_info() -> MovieInfo {
    let mut info = MovieInfo::default();
    info.title = "The Third Man".to_owned();
    info.external_id = "1092".to_owned();
    info.year = "1949".to_owned();
    info.genres = vec!["film noir".to_owned(), "thriller".to_owned()];
    info.overview = "Pulp novelist Holly Martins travels\nto shadowy postwar Vienna.".to_owned();
    info.directors = vec!["Carol Reed".to_owned()];
    info.actors = vec!["Joseph Cotten".to_owned(), "Alida Valli".to_owned()];
    info.moddate = Utc.timestamp_opt(1_280_000_000, 0).unwrap();
    info.set_rating(9);
    info
}

#[test]
fn info_record_round_trips() {
    let info = sample_info();
    let text = record::serialize_info(&info);
    let parsed = record::parse_info(&text, &logger());
    assert_eq!(parsed, info);
}

#[test]
fn malformed_info_fields_are_skipped() {
    let text = "[info]\n\
                title = Brazil\n\
                rating = not-a-number\n\
                year = 1985\n\
                garbage line without a key\n\
                moddate = later\n\
                unknown = ignored\n";
    let info = record::parse_info(text, &logger());
    assert_eq!(info.title, "Brazil");
    assert_eq!(info.year, "1985");
    assert_eq!(info.rating(), 0);
    assert_eq!(info.moddate.timestamp(), 0);
}

#[test]
fn info_record_accepts_fractional_moddate() {
    let text = "[info]\nmoddate = 1280000000.5\n";
    let info = record::parse_info(text, &logger());
    assert_eq!(info.moddate.timestamp(), 1_280_000_000);
}

#[test]
fn category_index_round_trips() {
    let categories = vec![
        Category::new("Movies", "movies"),
        Category::new("Concert] Films", "concerts/films"),
    ];
    let text = record::serialize_categories(&categories);
    assert_eq!(record::parse_categories(&text), categories);
}

#[test]
fn cache_upserts_and_point_lookups() {
    let mut cache = CacheStore::open_in_memory(&logger()).unwrap();
    let category = Category::new("Movies", "movies");
    cache.insert_category(&category).unwrap();

    let mut movie = Movie::new("alpha", "alpha");
    movie.info = sample_info();
    cache.save_movie(&category, &movie).unwrap();

    let mut loaded = Movie::new("alpha", "alpha");
    assert!(cache.load_movie(&category, &mut loaded).unwrap());
    assert_eq!(loaded.info, movie.info);

    // A second save with changed fields updates the same row.
    movie.info.set_rating(3);
    movie.info.moddate = Utc.timestamp_opt(1_290_000_000, 0).unwrap();
    cache.save_movie(&category, &movie).unwrap();
    let movies = cache.list_movies(&category).unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].info.rating(), 3);
    assert_eq!(movies[0].info.moddate.timestamp(), 1_290_000_000);

    let absent = Category::new("Series", "series");
    assert!(cache.list_movies(&absent).unwrap().is_empty());
    let mut missing = Movie::new("ghost", "ghost");
    assert!(!cache.load_movie(&category, &mut missing).unwrap());
}

#[test]
fn cache_delete_movie_removes_one_row() {
    let mut cache = CacheStore::open_in_memory(&logger()).unwrap();
    let category = Category::new("Movies", "movies");
    cache.insert_category(&category).unwrap();
    let alpha = Movie::new("alpha", "alpha");
    let beta = Movie::new("beta", "beta");
    cache.save_movie(&category, &alpha).unwrap();
    cache.save_movie(&category, &beta).unwrap();

    cache.delete_movie(&category, &alpha).unwrap();
    let movies = cache.list_movies(&category).unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].relative_path(), "beta");
}

#[test]
fn cache_save_categories_diffs_against_existing_rows() {
    let mut cache = CacheStore::open_in_memory(&logger()).unwrap();
    let kept = Category::new("Movies", "movies");
    let dropped = Category::new("Old", "old");
    cache.insert_category(&kept).unwrap();
    cache.insert_category(&dropped).unwrap();
    cache
        .save_movie(&dropped, &Movie::new("leftover", "leftover"))
        .unwrap();

    let renamed = Category::new("Films", "movies");
    let added = Category::new("Series", "series");
    cache
        .save_categories(&[renamed.clone(), added.clone()])
        .unwrap();

    let mut categories = cache.list_categories().unwrap();
    categories.sort_by(|a, b| a.path.cmp(&b.path));
    assert_eq!(categories, [renamed, added]);

    cache.insert_category(&dropped).unwrap();
    assert!(cache.list_movies(&dropped).unwrap().is_empty());
}

#[test]
fn cache_clear_empties_both_tables() {
    let mut cache = CacheStore::open_in_memory(&logger()).unwrap();
    let category = Category::new("Movies", "movies");
    cache.insert_category(&category).unwrap();
    cache
        .save_movie(&category, &Movie::new("alpha", "alpha"))
        .unwrap();

    cache.clear().unwrap();
    assert!(cache.list_categories().unwrap().is_empty());
    assert!(cache.list_movies(&category).unwrap().is_empty());
}
