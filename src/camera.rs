//! Capture service contract and the import-based camera used by the CLI.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::GalleryError;
use crate::storage::{BlobStore, Directory};

/// How the capture service should hand back the image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CameraResultType {
    #[default]
    Uri,
    Base64,
    DataUrl,
}

/// Where the capture service should take the image from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CameraSource {
    Prompt,
    #[default]
    Camera,
    Photos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureOptions {
    #[serde(default)]
    pub result_type: CameraResultType,

    #[serde(default)]
    pub source: CameraSource,

    /// JPEG quality, 0-100
    #[serde(default = "default_quality")]
    pub quality: u8,
}

fn default_quality() -> u8 {
    100
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            result_type: CameraResultType::default(),
            source: CameraSource::default(),
            quality: default_quality(),
        }
    }
}

impl CaptureOptions {
    pub fn validate(&self) -> Result<()> {
        if self.result_type != CameraResultType::Uri {
            return Err(GalleryError::UnsupportedResultType(self.result_type).into());
        }
        if self.quality > 100 {
            return Err(GalleryError::InvalidQuality(self.quality).into());
        }
        Ok(())
    }
}

/// Transient reference to a freshly captured image.
/// Only valid for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapturedPhoto {
    /// Native file path or `file://` URI (hybrid platforms)
    pub path: Option<String>,
    /// URL a web view can fetch
    pub web_path: Option<String>,
    /// Image format, e.g. "jpeg"
    pub format: String,
}

/// Platform capture service.
pub trait Camera: Send + Sync {
    fn get_photo(&self, options: &CaptureOptions) -> Result<CapturedPhoto>;
}

const URL_SCHEMES: &[&str] = &["http://", "https://", "data:", "file://"];

/// Session-scoped browser object URLs; nothing outside the page can fetch them.
const BLOB_SCHEME: &str = "blob:";

fn is_url(source: &str) -> bool {
    URL_SCHEMES.iter().any(|scheme| source.starts_with(scheme))
}

/// Camera that "captures" an existing image.
///
/// URLs are handed back untouched as the web path. Local files are first
/// copied into the cache directory, the way a device camera drops its shot
/// into scratch storage, and exposed through a `file://` URI.
pub struct ImportCamera {
    source: String,
    blobs: Arc<dyn BlobStore>,
}

impl ImportCamera {
    pub fn new(source: impl Into<String>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            source: source.into(),
            blobs,
        }
    }
}

impl Camera for ImportCamera {
    fn get_photo(&self, options: &CaptureOptions) -> Result<CapturedPhoto> {
        options.validate()?;

        if self.source.starts_with(BLOB_SCHEME) {
            return Err(GalleryError::UnsupportedUrl(self.source.clone()).into());
        }

        if is_url(&self.source) {
            tracing::debug!(source = %self.source, "Importing capture from url");
            return Ok(CapturedPhoto {
                path: None,
                web_path: Some(self.source.clone()),
                format: "jpeg".to_string(),
            });
        }

        let source = Path::new(&self.source);
        let bytes = std::fs::read(source)
            .with_context(|| format!("Failed to read capture source {}", source.display()))?;
        let format = source
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "jpeg".to_string());

        let name = format!("capture_{}.{}", Utc::now().timestamp_millis(), format);
        let written = self
            .blobs
            .write(&name, &BASE64.encode(bytes), Directory::Cache)?;

        tracing::debug!(
            source = %source.display(),
            uri = %written.uri,
            quality = options.quality,
            camera_source = ?options.source,
            "Imported capture"
        );

        Ok(CapturedPhoto {
            path: Some(written.uri.clone()),
            web_path: Some(written.uri),
            format,
        })
    }
}
