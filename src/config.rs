//! Runtime configuration, passed as JSON by the JavaScript bridge to `init`.
//!
//! Every field has a default so an empty or partial object is valid.

use serde::Deserialize;

use crate::monster::view::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Monsters shown per list page.
    pub page_size: usize,
    /// `localStorage` key holding the serialized monster list.
    pub monsters_key: String,
    /// `localStorage` key holding the literal `"true"` while logged in.
    pub session_key: String,
    pub username: String,
    pub password: String,
    /// Approximation of the browser's per-origin storage quota.
    pub storage_quota_bytes: usize,
    /// `log` level filter: off, error, warn, info, debug or trace.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            monsters_key: "monster_list".to_string(),
            session_key: "auth_logged_in".to_string(),
            username: "bob@bob.com".to_string(),
            password: "Test123".to_string(),
            storage_quota_bytes: 5 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse a JSON config object. Empty input or malformed JSON yields defaults.
    pub fn from_json(json: &str) -> Self {
        if json.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Config>(json) {
            Ok(mut config) => {
                if config.page_size == 0 {
                    config.page_size = Self::default().page_size;
                }
                config
            }
            Err(e) => {
                log::warn!("ignoring malformed config: {}", e);
                Self::default()
            }
        }
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(Config::from_json(""), Config::default());
        assert_eq!(Config::from_json("{}"), Config::default());
    }

    #[test]
    fn partial_override() {
        let config = Config::from_json(r#"{"page_size": 5, "log_level": "debug"}"#);
        assert_eq!(config.page_size, 5);
        assert_eq!(config.monsters_key, "monster_list");
        assert_eq!(config.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn malformed_json_falls_back() {
        assert_eq!(Config::from_json("{not json"), Config::default());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert_eq!(Config::from_json(r#"{"page_size": 0}"#).page_size, 10);
    }
}
