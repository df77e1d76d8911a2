use color_eyre::eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::{env, fs, io, path::PathBuf, time::Duration};

const CONFIG_FILE_PATH: &str = "config/app_config.toml";
const BACKEND_URL_ENV: &str = "SENTISCOPE_BACKEND_URL";

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application configuration values, loaded once at startup and handed to the
/// components that need them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_backend_url_value")]
    pub backend_url: String,
    #[serde(default = "default_request_timeout_secs_value")]
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from disk, then apply environment overrides. A missing
    /// file yields the defaults; a malformed file is an error for the caller to
    /// surface.
    pub fn load() -> Result<Self> {
        let mut config = load_config_from_disk()?;
        if let Ok(url) = env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                config.backend_url = url;
            }
        }
        config.normalize();
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn normalize(&mut self) {
        let trimmed = self.backend_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            self.backend_url = DEFAULT_BACKEND_URL.to_string();
        } else if trimmed.len() != self.backend_url.len() {
            self.backend_url = trimmed.to_string();
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Path to the configuration file, relative to the working directory.
pub fn config_file_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_PATH)
}

fn load_config_from_disk() -> Result<AppConfig> {
    let path = config_file_path();
    match fs::read_to_string(&path) {
        Ok(contents) => {
            let config: AppConfig = toml::from_str(&contents)
                .wrap_err_with(|| format!("failed to parse configuration at {}", path.display()))?;
            Ok(config)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(err) => Err(eyre!(format!(
            "failed to read configuration at {}: {}",
            path.display(),
            err
        ))),
    }
}

fn default_backend_url_value() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

const fn default_request_timeout_secs_value() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: AppConfig = toml::from_str("").expect("empty config should parse");
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn normalize_strips_trailing_slash() {
        let mut config = AppConfig {
            backend_url: "http://analytics.internal:9000/".to_string(),
            request_timeout_secs: 10,
        };
        config.normalize();
        assert_eq!(config.backend_url, "http://analytics.internal:9000");
    }

    #[test]
    fn normalize_replaces_blank_url_and_zero_timeout() {
        let mut config = AppConfig {
            backend_url: "   ".to_string(),
            request_timeout_secs: 0,
        };
        config.normalize();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }
}
