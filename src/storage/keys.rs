//! Well-known storage keys.
//!
//! Keys follow a `movie_app_<area>_<name>` convention. Callers append a
//! discriminator (`_<user>`, `_<movie id>`, `_<category>`) for per-item entries.

// Auth
pub const AUTH_USERS: &str = "movie_app_users";
pub const AUTH_CURRENT_USER: &str = "movie_app_current_user";
pub const AUTH_IS_LOGGED_IN: &str = "movie_app_is_logged_in";
pub const AUTH_KEEP_LOGIN: &str = "movie_app_keep_login";
pub const AUTH_TOKEN: &str = "movie_app_token";
pub const AUTH_SESSION_EXPIRY: &str = "movie_app_session_expiry";

// User data
pub const USER_WISHLIST: &str = "movie_app_wishlist";
pub const USER_WATCH_HISTORY: &str = "movie_app_watch_history";
pub const USER_SEARCH_HISTORY: &str = "movie_app_search_history";
pub const USER_PREFERENCES: &str = "movie_app_preferences";
pub const USER_SETTINGS: &str = "movie_app_settings";

// API cache
pub const CACHE_PREFIX: &str = "movie_app_cache";
pub const CACHE_MOVIES: &str = "movie_app_cache_movies";
pub const CACHE_GENRES: &str = "movie_app_cache_genres";
pub const CACHE_POPULAR: &str = "movie_app_cache_popular";
pub const CACHE_TRENDING: &str = "movie_app_cache_trending";
pub const CACHE_MOVIE_DETAILS: &str = "movie_app_cache_movie_details";

// Metadata
pub const STORAGE_VERSION: &str = "movie_app_storage_version";
pub const LAST_CLEANUP: &str = "movie_app_last_cleanup";

/// Pre-versioning flat keys and the namespaced keys that replace them.
pub const LEGACY_KEYS: &[(&str, &str)] = &[
    ("users", AUTH_USERS),
    ("currentUser", AUTH_CURRENT_USER),
    ("isLoggedIn", AUTH_IS_LOGGED_IN),
    ("keepLogin", AUTH_KEEP_LOGIN),
    ("movieWishlist", USER_WISHLIST),
];

/// `<namespace>_<discriminator>`
pub fn scoped(namespace: &str, discriminator: impl std::fmt::Display) -> String {
    format!("{}_{}", namespace, discriminator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_key() {
        assert_eq!(scoped(USER_WISHLIST, "a@b.com"), "movie_app_wishlist_a@b.com");
        assert_eq!(scoped(CACHE_MOVIE_DETAILS, 42), "movie_app_cache_movie_details_42");
    }

    #[test]
    fn test_cache_keys_share_prefix() {
        for key in [CACHE_MOVIES, CACHE_GENRES, CACHE_POPULAR, CACHE_TRENDING, CACHE_MOVIE_DETAILS] {
            assert!(key.starts_with(CACHE_PREFIX));
        }
    }
}
