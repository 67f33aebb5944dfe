use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::CaptureOptions;
use crate::platform::PlatformKind;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "PHOTO_GALLERY_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub platform: PlatformKind,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub webview: WebviewConfig,

    #[serde(default)]
    pub capture: CaptureOptions,

    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding the manifest
    #[serde(default = "default_kv_path")]
    pub kv_path: PathBuf,

    /// Key the manifest is stored under
    #[serde(default = "default_manifest_key")]
    pub manifest_key: String,

    /// Private data directory for saved photos
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Scratch directory for transient captures
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("photo-gallery")
}

fn default_kv_path() -> PathBuf {
    app_data_dir().join("storage.db")
}

fn default_manifest_key() -> String {
    "photos".to_string()
}

fn default_data_dir() -> PathBuf {
    app_data_dir().join("files")
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("photo-gallery")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kv_path: default_kv_path(),
            manifest_key: default_manifest_key(),
            data_dir: default_data_dir(),
            cache_dir: default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebviewConfig {
    /// Origin of the web view's local file server (hybrid only)
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

fn default_server_url() -> String {
    "http://localhost".to_string()
}

impl Default for WebviewConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FetchConfig {
    /// Timeout for fetching transient web captures. Unset waits forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl FetchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: PlatformKind::default(),
            storage: StorageConfig::default(),
            webview: WebviewConfig::default(),
            capture: CaptureOptions::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Config {
    /// Load from the default location, writing a default config on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.capture.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("photo-gallery")
    }

    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraResultType, CameraSource};
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.platform, PlatformKind::Hybrid);
        assert_eq!(config.storage.manifest_key, "photos");
        assert_eq!(config.webview.server_url, "http://localhost");
        assert_eq!(config.capture.quality, 100);
        assert_eq!(config.fetch.timeout(), None);
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
            platform = "web"

            [storage]
            manifest_key = "gallery"

            [capture]
            source = "photos"
            quality = 80

            [fetch]
            timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.platform, PlatformKind::Web);
        assert_eq!(config.storage.manifest_key, "gallery");
        assert_eq!(config.capture.source, CameraSource::Photos);
        assert_eq!(config.capture.result_type, CameraResultType::Uri);
        assert_eq!(config.capture.quality, 80);
        assert_eq!(config.fetch.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf/config.toml");

        let mut config = Config::default();
        config.platform = PlatformKind::Web;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.platform, PlatformKind::Web);
        assert_eq!(loaded.storage.kv_path, config.storage.kv_path);
    }

    #[test]
    fn test_first_load_writes_defaults_at_env_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh/config.toml");
        assert!(!path.exists());

        std::env::set_var(CONFIG_ENV, &path);
        let loaded = Config::load();
        std::env::remove_var(CONFIG_ENV);
        let loaded = loaded.unwrap();

        assert!(path.exists());
        let reread = Config::load_from(&path).unwrap();
        let defaults = Config::default();
        for config in [&loaded, &reread] {
            assert_eq!(config.platform, defaults.platform);
            assert_eq!(config.storage.kv_path, defaults.storage.kv_path);
            assert_eq!(config.storage.manifest_key, defaults.storage.manifest_key);
            assert_eq!(config.storage.data_dir, defaults.storage.data_dir);
            assert_eq!(config.webview.server_url, defaults.webview.server_url);
            assert_eq!(config.capture, defaults.capture);
            assert_eq!(config.fetch.timeout_secs, None);
        }
    }

    #[test]
    fn test_rejects_non_uri_result_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[capture]\nresult_type = \"base64\"\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_rejects_bad_quality() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[capture]\nquality = 150\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
