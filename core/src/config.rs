//! Client configuration from defaults, the environment, or a `.env` file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5151/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend root, e.g. `http://localhost:5151/api`.
    pub base_url: String,
    /// Transport-level timeout for a single request.
    pub request_timeout: Duration,
    /// How long a store may stay in `loading` before it gives up.
    pub loading_timeout: Duration,
    /// Directory for the persisted session. `None` keeps it in memory.
    pub session_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            loading_timeout: crate::stores::DEFAULT_LOADING_TIMEOUT,
            session_dir: None,
        }
    }
}

impl ClientConfig {
    /// Read `EVENTLIST_*` variables from the process environment; unset
    /// variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load `path` into the environment, then behave like `from_env`.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::from_filename(path.as_ref())?;
        Self::from_env()
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let var = |key| lookup(key).filter(|v: &String| !v.trim().is_empty());

        if let Some(url) = var("EVENTLIST_API_BASE_URL") {
            url::Url::parse(&url).map_err(|_| ConfigError::Invalid {
                key: "EVENTLIST_API_BASE_URL",
                value: url.clone(),
            })?;
            config.base_url = url;
        }
        if let Some(secs) = var("EVENTLIST_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = parse_secs("EVENTLIST_REQUEST_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = var("EVENTLIST_LOADING_TIMEOUT_SECS") {
            config.loading_timeout = parse_secs("EVENTLIST_LOADING_TIMEOUT_SECS", &secs)?;
        }
        if let Some(dir) = var("EVENTLIST_SESSION_DIR") {
            config.session_dir = Some(PathBuf::from(dir));
        }
        Ok(config)
    }
}

fn parse_secs(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.loading_timeout, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides_are_applied() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("EVENTLIST_API_BASE_URL", "http://backend:5151/api"),
            ("EVENTLIST_LOADING_TIMEOUT_SECS", "5"),
            ("EVENTLIST_SESSION_DIR", "/tmp/eventlist"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://backend:5151/api");
        assert_eq!(config.loading_timeout, Duration::from_secs(5));
        assert_eq!(config.session_dir, Some(PathBuf::from("/tmp/eventlist")));
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("EVENTLIST_REQUEST_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "EVENTLIST_REQUEST_TIMEOUT_SECS", .. }));

        let err = ClientConfig::from_lookup(lookup(&[("EVENTLIST_LOADING_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = ClientConfig::from_lookup(lookup(&[("EVENTLIST_API_BASE_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn env_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "EVENTLIST_TEST_ONLY_MARKER=1\n").unwrap();

        ClientConfig::from_env_file(&path).unwrap();
        assert_eq!(std::env::var("EVENTLIST_TEST_ONLY_MARKER").as_deref(), Ok("1"));
    }

    #[test]
    fn missing_env_file_is_an_error() {
        let err = ClientConfig::from_env_file("/definitely/not/here/.env").unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(_)));
    }
}
