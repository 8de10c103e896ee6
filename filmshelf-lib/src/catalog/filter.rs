use super::movie::Movie;

/// A predicate over movies, used to narrow listings.
pub trait MovieFilter {
    fn test(&self, movie: &Movie) -> bool;
}

/// Keep the movies matching the filter, or the ones not matching it when
/// `positive` is false. The input order is preserved.
pub fn filter_movies(
    movies: Vec<Movie>,
    filter: &dyn MovieFilter,
    positive: bool,
) -> Vec<Movie> {
    movies
        .into_iter()
        .filter(|movie| filter.test(movie) == positive)
        .collect()
}

/// Matches movies whose display name contains the given fragment.
pub struct NameFilter(pub String);

impl MovieFilter for NameFilter {
    fn test(&self, movie: &Movie) -> bool {
        movie.name().contains(&self.0)
    }
}

/// Matches movies that carry an external metadata id.
pub struct ExternalIdFilter;

impl MovieFilter for ExternalIdFilter {
    fn test(&self, movie: &Movie) -> bool {
        !movie.info.external_id.is_empty()
    }
}
