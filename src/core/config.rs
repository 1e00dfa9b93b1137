use crate::core::cache::KeyOrder;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.exchangerate.host";
pub const DEFAULT_TTL_SECONDS: u64 = 60;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Disk,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    /// Directory for the disk backend, defaults to the platform data dir.
    pub path: Option<String>,
    #[serde(default)]
    pub key_order: KeyOrder,
}

impl CacheConfig {
    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(project_dirs()?.data_dir().join("cache"))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_ttl_seconds() -> u64 {
    DEFAULT_TTL_SECONDS
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("host", "exchangerate", "fxrates")
        .context("Could not determine project directories")
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_url: default_base_url(),
            ttl_seconds: default_ttl_seconds(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or falls back to built-in defaults when
    /// none has been written yet.
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
base_url: "http://localhost:8080"
ttl_seconds: 300
cache:
  backend: disk
  path: "/tmp/fxrates"
  key_order: sorted
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.ttl(), Duration::from_secs(300));
        assert_eq!(config.cache.backend, CacheBackend::Disk);
        assert_eq!(config.cache.key_order, KeyOrder::Sorted);
        assert_eq!(
            config.cache.data_path().unwrap(),
            PathBuf::from("/tmp/fxrates")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.ttl_seconds, 60);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.key_order, KeyOrder::Insertion);
        assert!(config.cache.path.is_none());

        let partial: AppConfig =
            serde_yaml::from_str("ttl_seconds: 5").expect("Failed to deserialize");
        assert_eq!(partial.ttl_seconds, 5);
        assert_eq!(partial.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: \"http://example.com\"").unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.ttl_seconds, DEFAULT_TTL_SECONDS);
    }

    #[test]
    fn test_load_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");

        let err = AppConfig::load_from_path(&missing).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file"));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ttl_seconds: [not, a, number]").unwrap();

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config file"));
    }
}
