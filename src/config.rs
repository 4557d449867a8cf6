//! Configuration file parser for ~/.config/shoplist/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde, though we log a warning when the file
//! contains potential typos.
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::util::{validate_server_url, UrlValidationError};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid server_url: {0}")]
    InvalidServerUrl(#[from] UrlValidationError),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level client configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
///
/// `Debug` is implemented by hand so the session cookie never reaches logs.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the shopping list server.
    pub server_url: String,

    /// Recorded as `added_by_id` on queued adds.
    pub user_id: i64,

    /// Raw `Cookie` header value for an authenticated session,
    /// e.g. `session=...`.
    pub session_cookie: Option<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Start every session offline; changes are only queued.
    pub start_offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            user_id: 0,
            session_cookie: None,
            request_timeout_secs: 30,
            start_offline: false,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_url", &self.server_url)
            .field("user_id", &self.user_id)
            .field(
                "session_cookie",
                &self.session_cookie.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("start_offline", &self.start_offline)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "server_url",
        "user_id",
        "session_cookie",
        "request_timeout_secs",
        "start_offline",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    /// - Non-http(s) or plain-http remote `server_url` → `Err(ConfigError::InvalidServerUrl)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        validate_server_url(&config.server_url)?;
        tracing::info!(
            path = %path.display(),
            server_url = %config.server_url,
            user_id = config.user_id,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Session cookie wrapped for handing to the HTTP client.
    pub fn session_secret(&self) -> Option<SecretString> {
        self.session_cookie
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| SecretString::from(c.to_string()))
    }

    /// Request timeout; zero falls back to the default of 30 seconds.
    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_secs {
            0 => Duration::from_secs(Self::default().request_timeout_secs),
            secs => Duration::from_secs(secs),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn write_config(name: &str, content: &str) -> (std::path::PathBuf, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("shoplist_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://localhost:5000");
        assert_eq!(config.user_id, 0);
        assert!(config.session_cookie.is_none());
        assert_eq!(config.request_timeout_secs, 30);
        assert!(!config.start_offline);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/shoplist_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.server_url, "http://localhost:5000");
    }

    #[test]
    fn test_empty_file_returns_default() {
        let (dir, path) = write_config("empty", "");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.user_id, 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("partial", "user_id = 7\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.user_id, 7);
        assert_eq!(config.server_url, "http://localhost:5000");
        assert!(!config.start_offline);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
server_url = "https://lists.example.com"
user_id = 42
session_cookie = "session=abc123"
request_timeout_secs = 10
start_offline = true
"#;
        let (dir, path) = write_config("full", content);

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server_url, "https://lists.example.com");
        assert_eq!(config.user_id, 42);
        assert_eq!(config.session_cookie.as_deref(), Some("session=abc123"));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.start_offline);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let content = r#"
user_id = 3
theme = "dark"
another_unknown = 42
"#;
        let (dir, path) = write_config("unknown", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.user_id, 3);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("wrongtype", "user_id = \"seven\"\n");
        assert!(Config::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_plain_http_remote_server_rejected() {
        let (dir, path) = write_config("plainhttp", "server_url = \"http://lists.example.com\"\n");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidServerUrl(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_plain_http_localhost_accepted() {
        let (dir, path) = write_config("localhost", "server_url = \"http://127.0.0.1:8080\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.server_url, "http://127.0.0.1:8080");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"a".repeat(1_048_577));

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_debug_masks_session_cookie() {
        let config = Config {
            session_cookie: Some("session=super-secret-12345".to_string()),
            ..Config::default()
        };

        let debug_output = format!("{:?}", config);
        assert!(
            !debug_output.contains("super-secret-12345"),
            "Debug output should not contain the cookie"
        );
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_debug_shows_none_when_no_cookie() {
        let debug_output = format!("{:?}", Config::default());
        assert!(debug_output.contains("None"));
        assert!(!debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_session_secret_skips_blank_cookie() {
        let mut config = Config {
            session_cookie: Some("  ".to_string()),
            ..Config::default()
        };
        assert!(config.session_secret().is_none());

        config.session_cookie = Some("session=xyz".to_string());
        let secret = config.session_secret().unwrap();
        assert_eq!(secret.expose_secret(), "session=xyz");
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }
}
