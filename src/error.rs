//! Typed failures raised by the gallery and its storage backends.
//!
//! Most call sites propagate these through `anyhow::Result`; the enum exists
//! so callers (and tests) can `downcast_ref` to the specific case.

use std::path::PathBuf;
use thiserror::Error;

use crate::camera::CameraResultType;

#[derive(Debug, Error)]
pub enum GalleryError {
    /// Hybrid captures must carry a native file path.
    #[error("captured photo has no file path")]
    MissingPath,

    /// Web captures must carry a transient web path.
    #[error("captured photo has no web path")]
    MissingWebPath,

    #[error("unsupported url scheme: {0}")]
    UnsupportedUrl(String),

    #[error("malformed data url")]
    InvalidDataUrl,

    #[error("blob not found: {}", .0.display())]
    BlobNotFound(PathBuf),

    #[error("path escapes its storage directory: {0}")]
    PathOutsideDirectory(String),

    /// Only uri results can be carried by a captured photo.
    #[error("unsupported capture result type {0:?} (only 'uri' is supported)")]
    UnsupportedResultType(CameraResultType),

    #[error("capture quality must be between 0 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("unknown platform '{0}' (expected 'hybrid' or 'web')")]
    UnknownPlatform(String),
}
