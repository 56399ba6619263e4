//! Client configuration.
//!
//! Settings come from a JSON file under the platform config directory and are
//! then overridden by `COURSESYNC_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_TTL;
use crate::error::{Error, Result};

const SETTINGS_FILE_NAME: &str = "settings.json";

pub const ENV_API_URL: &str = "COURSESYNC_API_URL";
pub const ENV_TOKEN: &str = "COURSESYNC_TOKEN";
pub const ENV_DB_PATH: &str = "COURSESYNC_DB_PATH";
pub const ENV_TTL_SECS: &str = "COURSESYNC_TTL_SECS";

/// Where to sync from and where to keep the local store.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncSettings {
    /// LMS base URL, e.g. `https://school.instructure.com`
    pub api_base_url: Option<String>,
    /// Personal access token sent as a bearer token
    pub access_token: Option<String>,
    /// Local database file
    pub db_path: Option<PathBuf>,
    /// Freshness window for cached listings
    pub default_ttl_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            access_token: None,
            db_path: None,
            default_ttl_secs: DEFAULT_TTL.as_secs(),
        }
    }
}

impl std::fmt::Debug for SyncSettings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SyncSettings")
            .field("api_base_url", &self.api_base_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("db_path", &self.db_path)
            .field("default_ttl_secs", &self.default_ttl_secs)
            .finish()
    }
}

/// Trim a text setting, treating a blank value as unset.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Parse an LMS base URL. Only `http` and `https` URLs with a host are
/// accepted.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|error| Error::Config(format!("invalid API base URL `{raw}`: {error}")))?;
    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(Error::Config(format!(
            "API base URL `{raw}` must be an http:// or https:// address"
        )));
    }
    Ok(url)
}

/// Default location of the settings file, if the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("coursesync").join(SETTINGS_FILE_NAME))
}

impl SyncSettings {
    /// Load from the default path and the process environment.
    pub fn load() -> Result<Self> {
        let mut settings = match default_settings_path() {
            Some(path) => Self::load_from_path(&path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Load from a settings file; a missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let mut settings = serde_json::from_str::<Self>(&raw).map_err(|error| {
            Error::Config(format!(
                "Failed to parse settings at {}: {error}",
                path.display()
            ))
        })?;
        settings.normalize()?;
        Ok(settings)
    }

    /// Override fields from environment-style variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = non_empty(lookup(ENV_API_URL)) {
            self.api_base_url = Some(url);
        }
        if let Some(token) = non_empty(lookup(ENV_TOKEN)) {
            self.access_token = Some(token);
        }
        if let Some(path) = non_empty(lookup(ENV_DB_PATH)) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(ttl) = non_empty(lookup(ENV_TTL_SECS)) {
            self.default_ttl_secs = ttl.parse().map_err(|_| {
                Error::Config(format!("{ENV_TTL_SECS} must be a whole number of seconds"))
            })?;
        }
        self.normalize()
    }

    /// The configured TTL as a [`Duration`].
    pub const fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    fn normalize(&mut self) -> Result<()> {
        self.api_base_url = non_empty(self.api_base_url.take())
            .map(|url| url.trim_end_matches('/').to_string());
        self.access_token = non_empty(self.access_token.take());

        if let Some(url) = &self.api_base_url {
            parse_base_url(url)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let tmp = tempdir().unwrap();
        let settings = SyncSettings::load_from_path(&tmp.path().join("nope.json")).unwrap();
        assert_eq!(settings, SyncSettings::default());
        assert_eq!(settings.default_ttl(), DEFAULT_TTL);
    }

    #[test]
    fn test_load_from_file_normalizes() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(
            &path,
            concat!(
                r#"{"api_base_url": " https://lms.test/ ", "#,
                r#""access_token": "  ", "default_ttl_secs": 60}"#,
            ),
        )
        .unwrap();

        let settings = SyncSettings::load_from_path(&path).unwrap();
        assert_eq!(settings.api_base_url.as_deref(), Some("https://lms.test"));
        assert_eq!(settings.access_token, None);
        assert_eq!(settings.default_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_file_rejects_unknown_fields_and_bad_urls() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("settings.json");

        std::fs::write(&path, r#"{"api_url": "https://lms.test"}"#).unwrap();
        assert!(matches!(
            SyncSettings::load_from_path(&path),
            Err(Error::Config(_))
        ));

        std::fs::write(&path, r#"{"api_base_url": "lms.test"}"#).unwrap();
        assert!(SyncSettings::load_from_path(&path).is_err());
    }

    #[test]
    fn test_non_empty_trims_and_drops_blanks() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(" \t ".to_string())), None);
        assert_eq!(
            non_empty(Some(" https://lms.test ".to_string())).as_deref(),
            Some("https://lms.test")
        );
    }

    #[test]
    fn test_parse_base_url_requires_http_with_host() {
        assert_eq!(
            parse_base_url(" http://localhost:8080 ").unwrap().as_str(),
            "http://localhost:8080/"
        );
        assert!(parse_base_url("https://lms.test").is_ok());

        for raw in ["lms.test", "ftp://lms.test", "mailto:someone@lms.test", "https://"] {
            assert!(
                matches!(parse_base_url(raw), Err(Error::Config(_))),
                "accepted {raw}"
            );
        }
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut settings = SyncSettings {
            api_base_url: Some("https://file.test".to_string()),
            ..SyncSettings::default()
        };

        settings
            .apply_env(env(&[
                (ENV_API_URL, "https://env.test/"),
                (ENV_TOKEN, "abc"),
                (ENV_DB_PATH, "/tmp/coursesync.db"),
                (ENV_TTL_SECS, "30"),
            ]))
            .unwrap();

        assert_eq!(settings.api_base_url.as_deref(), Some("https://env.test"));
        assert_eq!(settings.access_token.as_deref(), Some("abc"));
        assert_eq!(settings.db_path, Some(PathBuf::from("/tmp/coursesync.db")));
        assert_eq!(settings.default_ttl_secs, 30);
    }

    #[test]
    fn test_env_rejects_bad_ttl() {
        let mut settings = SyncSettings::default();
        assert!(settings.apply_env(env(&[(ENV_TTL_SECS, "soon")])).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let settings = SyncSettings {
            access_token: Some("secret".to_string()),
            ..SyncSettings::default()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
