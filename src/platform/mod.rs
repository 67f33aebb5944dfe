//! Platform capability layer.
//!
//! Everything that differs between a native (hybrid) shell and a plain
//! browser lives behind [`Platform`]. The implementation is chosen once,
//! at startup, by [`create_platform`].

pub mod hybrid;
pub mod web;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::camera::{Camera, CaptureOptions, CapturedPhoto};
use crate::config::Config;
use crate::error::GalleryError;
use crate::storage::{BlobStore, Directory, WriteFileResult};

pub use hybrid::HybridPlatform;
pub use web::WebPlatform;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// Packaged native app with filesystem and camera access
    #[default]
    Hybrid,
    /// Plain browser context
    Web,
}

impl PlatformKind {
    pub fn is_hybrid(&self) -> bool {
        matches!(self, PlatformKind::Hybrid)
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::Hybrid => write!(f, "hybrid"),
            PlatformKind::Web => write!(f, "web"),
        }
    }
}

impl FromStr for PlatformKind {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hybrid" => Ok(PlatformKind::Hybrid),
            "web" => Ok(PlatformKind::Web),
            _ => Err(GalleryError::UnknownPlatform(s.to_string())),
        }
    }
}

/// Capabilities the gallery needs from its host.
pub trait Platform: Send + Sync {
    fn kind(&self) -> PlatformKind;

    /// Ask the capture service for a new image
    fn capture(&self, options: &CaptureOptions) -> Result<CapturedPhoto>;

    /// Read the contents of a captured image as base64
    fn read_transient(&self, photo: &CapturedPhoto) -> Result<String>;

    /// Read a stored blob as base64
    fn read_blob(&self, path: &str, directory: Option<Directory>) -> Result<String>;

    /// Store base64 contents as a blob
    fn write_blob(&self, path: &str, data: &str, directory: Directory) -> Result<WriteFileResult>;

    /// Turn a native URI into something a display surface can load
    fn to_display_ref(&self, uri: &str) -> String;
}

const FILE_PREFIX: &str = "/_capacitor_file_";
const CONTENT_PREFIX: &str = "/_capacitor_content_";

/// Rewrite a native file or content URI so the web view's local server
/// serves it. Other references are returned unchanged.
pub fn convert_file_src(server_url: &str, uri: &str) -> String {
    let server = server_url.trim_end_matches('/');
    if uri.starts_with('/') {
        format!("{}{}{}", server, FILE_PREFIX, uri)
    } else if let Some(rest) = uri.strip_prefix("file://") {
        format!("{}{}{}", server, FILE_PREFIX, rest)
    } else if let Some(rest) = uri.strip_prefix("content:/") {
        format!("{}{}{}", server, CONTENT_PREFIX, rest)
    } else {
        uri.to_string()
    }
}

/// Build the platform selected in `config`.
pub fn create_platform(
    config: &Config,
    camera: Arc<dyn Camera>,
    blobs: Arc<dyn BlobStore>,
) -> Arc<dyn Platform> {
    tracing::info!(platform = %config.platform, "Selected platform");

    match config.platform {
        PlatformKind::Hybrid => Arc::new(HybridPlatform::new(
            camera,
            blobs,
            &config.webview.server_url,
        )),
        PlatformKind::Web => Arc::new(WebPlatform::new(camera, blobs, config.fetch.timeout())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_absolute_path() {
        assert_eq!(
            convert_file_src("http://localhost", "/data/user/0/app/files/1.jpeg"),
            "http://localhost/_capacitor_file_/data/user/0/app/files/1.jpeg"
        );
    }

    #[test]
    fn test_convert_file_uri() {
        assert_eq!(
            convert_file_src("capacitor://localhost/", "file:///var/mobile/1.jpeg"),
            "capacitor://localhost/_capacitor_file_/var/mobile/1.jpeg"
        );
    }

    #[test]
    fn test_convert_content_uri() {
        assert_eq!(
            convert_file_src("http://localhost", "content://media/external/images/7"),
            "http://localhost/_capacitor_content_/media/external/images/7"
        );
    }

    #[test]
    fn test_convert_leaves_urls_alone() {
        assert_eq!(
            convert_file_src("http://localhost", "https://example.com/a.jpeg"),
            "https://example.com/a.jpeg"
        );
    }

    #[test]
    fn test_platform_kind_parse() {
        assert_eq!("hybrid".parse::<PlatformKind>().unwrap(), PlatformKind::Hybrid);
        assert_eq!("WEB".parse::<PlatformKind>().unwrap(), PlatformKind::Web);
        assert!("desktop".parse::<PlatformKind>().is_err());
    }
}
