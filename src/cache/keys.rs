use std::fmt;
use std::time::Duration;

use crate::cache::{LONG, MEDIUM, SHORT, WEEK};
use crate::storage::keys::{
    scoped, CACHE_GENRES, CACHE_MOVIES, CACHE_MOVIE_DETAILS, CACHE_POPULAR, CACHE_TRENDING,
};

/// What a cached API response is, which determines its key and default TTL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Popular,
    Trending,
    Genres,
    MovieDetails(u64),
    Search(String),
    Category(String),
    MovieImages(u64),
}

impl CacheKey {
    pub fn key(&self) -> String {
        match self {
            CacheKey::Popular => CACHE_POPULAR.to_string(),
            CacheKey::Trending => CACHE_TRENDING.to_string(),
            CacheKey::Genres => CACHE_GENRES.to_string(),
            CacheKey::MovieDetails(id) => scoped(CACHE_MOVIE_DETAILS, id),
            CacheKey::Search(query) => scoped(CACHE_MOVIES, format!("search_{}", query)),
            CacheKey::Category(category) => scoped(CACHE_MOVIES, category),
            CacheKey::MovieImages(id) => scoped("movie_images", id),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        match self {
            CacheKey::Trending => SHORT,
            CacheKey::Popular | CacheKey::Search(_) | CacheKey::Category(_) => MEDIUM,
            CacheKey::MovieDetails(_) => LONG,
            CacheKey::Genres | CacheKey::MovieImages(_) => WEEK,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(CacheKey::Popular.key(), "movie_app_cache_popular");
        assert_eq!(
            CacheKey::MovieDetails(550).key(),
            "movie_app_cache_movie_details_550"
        );
        assert_eq!(
            CacheKey::Search("heat".into()).key(),
            "movie_app_cache_movies_search_heat"
        );
        assert_eq!(
            CacheKey::Category("now_playing".into()).key(),
            "movie_app_cache_movies_now_playing"
        );
        assert_eq!(CacheKey::MovieImages(7).to_string(), "movie_images_7");
    }

    #[test]
    fn test_default_ttls() {
        assert_eq!(CacheKey::Trending.default_ttl(), SHORT);
        assert_eq!(CacheKey::Genres.default_ttl(), WEEK);
        assert_eq!(CacheKey::MovieDetails(1).default_ttl(), LONG);
        assert_eq!(CacheKey::Search("x".into()).default_ttl(), MEDIUM);
    }
}
