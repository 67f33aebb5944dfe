use anyhow::Result;
use std::sync::Arc;

use super::{convert_file_src, Platform, PlatformKind};
use crate::camera::{Camera, CaptureOptions, CapturedPhoto};
use crate::error::GalleryError;
use crate::storage::{BlobStore, Directory, WriteFileResult};

/// Native shell: captures land on the filesystem and stored URIs are served
/// back to the web view through its local server.
pub struct HybridPlatform {
    camera: Arc<dyn Camera>,
    blobs: Arc<dyn BlobStore>,
    server_url: String,
}

impl HybridPlatform {
    pub fn new(camera: Arc<dyn Camera>, blobs: Arc<dyn BlobStore>, server_url: &str) -> Self {
        Self {
            camera,
            blobs,
            server_url: server_url.to_string(),
        }
    }
}

impl Platform for HybridPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Hybrid
    }

    fn capture(&self, options: &CaptureOptions) -> Result<CapturedPhoto> {
        self.camera.get_photo(options)
    }

    fn read_transient(&self, photo: &CapturedPhoto) -> Result<String> {
        let path = photo.path.as_deref().ok_or(GalleryError::MissingPath)?;
        self.blobs.read(path, None)
    }

    fn read_blob(&self, path: &str, directory: Option<Directory>) -> Result<String> {
        self.blobs.read(path, directory)
    }

    fn write_blob(&self, path: &str, data: &str, directory: Directory) -> Result<WriteFileResult> {
        self.blobs.write(path, data, directory)
    }

    fn to_display_ref(&self, uri: &str) -> String {
        convert_file_src(&self.server_url, uri)
    }
}
