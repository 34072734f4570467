//! Environment variable utilities
//!
//! Generic `env_get<T>` function for parsing environment variables with defaults.
//!
//! # Usage
//!
//! ```ignore
//! use pool_core::env::{env_get, env_get_bool};
//!
//! let workers: usize = env_get("PTHREADER_POOL_WORKERS", 4);
//! let verbose: bool = env_get_bool("PTHREADER_POOL_VERBOSE", false);
//! ```

use std::str::FromStr;

/// Get environment variable parsed as type T, or return default
///
/// Works with any type that implements `FromStr`.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Get environment variable as boolean
///
/// Accepts: "1", "true", "yes", "on" (case-insensitive) as true.
/// Everything else (including unset) returns the default.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_get_default() {
        let val: usize = env_get("__POOL_TEST_UNSET_VAR__", 42);
        assert_eq!(val, 42);
    }

    #[test]
    fn test_env_get_bool_variants() {
        std::env::set_var("__POOL_TEST_BOOL__", "1");
        assert!(env_get_bool("__POOL_TEST_BOOL__", false));

        std::env::set_var("__POOL_TEST_BOOL__", "yes");
        assert!(env_get_bool("__POOL_TEST_BOOL__", false));

        std::env::set_var("__POOL_TEST_BOOL__", "0");
        assert!(!env_get_bool("__POOL_TEST_BOOL__", true));

        std::env::set_var("__POOL_TEST_BOOL__", "garbage");
        assert!(!env_get_bool("__POOL_TEST_BOOL__", false));

        std::env::remove_var("__POOL_TEST_BOOL__");
    }

    #[test]
    fn test_env_get_invalid_parse_falls_back() {
        std::env::set_var("__POOL_TEST_INVALID__", "not_a_number");
        let val: usize = env_get("__POOL_TEST_INVALID__", 99);
        assert_eq!(val, 99);
        std::env::remove_var("__POOL_TEST_INVALID__");
    }
}
