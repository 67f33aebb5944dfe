//! Photo records and the manifest they are stored in.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix used to turn stored base64 blob contents into a displayable image.
pub const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Extension appended to every durable photo filename.
pub const PHOTO_EXTENSION: &str = "jpeg";

/// A photo known to the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPhoto {
    /// Identifier of the durable blob. Stable across restarts.
    pub filepath: String,
    /// Reference a display surface can load directly.
    #[serde(
        rename = "webviewPath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub webview_path: Option<String>,
}

impl UserPhoto {
    pub fn new(filepath: impl Into<String>, webview_path: Option<String>) -> Self {
        Self {
            filepath: filepath.into(),
            webview_path,
        }
    }
}

/// Durable filename for a photo captured at `at`, e.g. `1700000000000.jpeg`.
pub fn file_name_at(at: DateTime<Utc>) -> String {
    format!("{}.{}", at.timestamp_millis(), PHOTO_EXTENSION)
}

/// Build a `data:` URL from base64 JPEG contents.
pub fn jpeg_data_url(base64_data: &str) -> String {
    format!("{}{}", JPEG_DATA_URL_PREFIX, base64_data)
}

/// Parse a stored manifest. `None` (no manifest yet) yields an empty list.
pub fn decode_manifest(raw: Option<&str>) -> Result<Vec<UserPhoto>> {
    match raw {
        Some(json) => serde_json::from_str(json).context("Failed to parse photo manifest"),
        None => Ok(Vec::new()),
    }
}

/// Serialize the full photo list for storage.
pub fn encode_manifest(photos: &[UserPhoto]) -> Result<String> {
    serde_json::to_string(photos).context("Failed to serialize photo manifest")
}
