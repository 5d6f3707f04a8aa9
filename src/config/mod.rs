//! Build-time configuration.
//!
//! Values are baked in when the wasm bundle is compiled
//! (`VITE_API_BASE_URL=... VITE_FRONTEND_URL=... trunk build`) and cannot change at runtime.
//! The unprefixed `API_BASE_URL` / `FRONTEND_URL` are accepted as well. A wasm build with
//! neither set fails to compile; native builds (tests, tooling) fall back to localhost.

use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    /// Backend origin, including any path prefix; no trailing slash.
    pub api_base_url: String,
    /// Public site, used by the "Go to website" action.
    pub frontend_url: String,
    /// `tracing` filter directive.
    pub log_level: String,
}

/// First of `preferred` / `fallback` that is set and non-empty.
const fn first_set(preferred: Option<&'static str>, fallback: Option<&'static str>) -> Option<&'static str> {
    match preferred {
        Some(v) if !v.is_empty() => Some(v),
        _ => match fallback {
            Some(v) if !v.is_empty() => Some(v),
            _ => None,
        },
    }
}

const BUILD_API_BASE_URL: Option<&str> =
    first_set(option_env!("VITE_API_BASE_URL"), option_env!("API_BASE_URL"));
const BUILD_FRONTEND_URL: Option<&str> =
    first_set(option_env!("VITE_FRONTEND_URL"), option_env!("FRONTEND_URL"));

#[cfg(target_arch = "wasm32")]
const _: () = {
    assert!(
        BUILD_API_BASE_URL.is_some(),
        "VITE_API_BASE_URL (or API_BASE_URL) must be set when building the console"
    );
    assert!(
        BUILD_FRONTEND_URL.is_some(),
        "VITE_FRONTEND_URL (or FRONTEND_URL) must be set when building the console"
    );
};

fn pick(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

impl EnvConfig {
    pub fn new(api_base_url: Option<&str>, frontend_url: Option<&str>, log_level: Option<&str>) -> Self {
        Self {
            api_base_url: pick(api_base_url, DEFAULT_API_BASE_URL),
            frontend_url: pick(frontend_url, DEFAULT_FRONTEND_URL),
            log_level: pick(log_level, DEFAULT_LOG_LEVEL),
        }
    }

    pub fn from_build_env() -> Self {
        Self::new(
            BUILD_API_BASE_URL,
            BUILD_FRONTEND_URL,
            option_env!("LOG_LEVEL"),
        )
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::from_build_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset_or_blank() {
        let c = EnvConfig::new(None, Some("  "), None);
        assert_eq!(c.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(c.frontend_url, DEFAULT_FRONTEND_URL);
        assert_eq!(c.log_level, "info");
    }

    #[test]
    fn test_trailing_slashes_are_stripped() {
        let c = EnvConfig::new(Some("https://api.example.edu/v1/"), Some("https://example.edu//"), Some("debug"));
        assert_eq!(c.api_base_url, "https://api.example.edu/v1");
        assert_eq!(c.frontend_url, "https://example.edu");
        assert_eq!(c.log_level, "debug");
    }

    #[test]
    fn test_prefixed_variable_wins() {
        assert_eq!(first_set(Some("https://a"), Some("https://b")), Some("https://a"));
        assert_eq!(first_set(None, Some("https://b")), Some("https://b"));
        assert_eq!(first_set(Some(""), Some("https://b")), Some("https://b"));
        assert_eq!(first_set(Some(""), None), None);
        assert_eq!(first_set(None, None), None);
    }
}
