use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use super::{Platform, PlatformKind};
use crate::camera::{Camera, CaptureOptions, CapturedPhoto};
use crate::error::GalleryError;
use crate::storage::fs::path_from_uri;
use crate::storage::{BlobStore, Directory, WriteFileResult};

/// Browser context: captures arrive as URLs and must be fetched before they
/// can be stored.
pub struct WebPlatform {
    camera: Arc<dyn Camera>,
    blobs: Arc<dyn BlobStore>,
    agent: ureq::Agent,
}

impl WebPlatform {
    pub fn new(camera: Arc<dyn Camera>, blobs: Arc<dyn BlobStore>, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            camera,
            blobs,
            agent: builder.build(),
        }
    }

    /// Fetch a transient URL and return its body as base64
    fn fetch(&self, url: &str) -> Result<String> {
        if url.starts_with("http://") || url.starts_with("https://") {
            let response = self
                .agent
                .get(url)
                .call()
                .map_err(|e| anyhow!("Fetching {} failed: {}", url, e))?;

            let mut bytes = Vec::new();
            response
                .into_reader()
                .read_to_end(&mut bytes)
                .with_context(|| format!("Failed to read response body from {}", url))?;
            Ok(BASE64.encode(bytes))
        } else if url.starts_with("file://") {
            let path = path_from_uri(url)
                .ok_or_else(|| GalleryError::UnsupportedUrl(url.to_string()))?;
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(BASE64.encode(bytes))
        } else if let Some(rest) = url.strip_prefix("data:") {
            decode_data_url(rest)
        } else {
            Err(GalleryError::UnsupportedUrl(url.to_string()).into())
        }
    }
}

/// Body of a base64 `data:` URL (everything after the scheme)
fn decode_data_url(rest: &str) -> Result<String> {
    let (meta, payload) = rest.split_once(',').ok_or(GalleryError::InvalidDataUrl)?;
    if !meta.ends_with(";base64") {
        return Err(GalleryError::InvalidDataUrl.into());
    }
    let bytes = BASE64
        .decode(payload)
        .map_err(|_| GalleryError::InvalidDataUrl)?;
    Ok(BASE64.encode(bytes))
}

impl Platform for WebPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Web
    }

    fn capture(&self, options: &CaptureOptions) -> Result<CapturedPhoto> {
        self.camera.get_photo(options)
    }

    fn read_transient(&self, photo: &CapturedPhoto) -> Result<String> {
        let url = photo.web_path.as_deref().ok_or(GalleryError::MissingWebPath)?;
        tracing::debug!(url, "Fetching transient capture");
        self.fetch(url)
    }

    fn read_blob(&self, path: &str, directory: Option<Directory>) -> Result<String> {
        self.blobs.read(path, directory)
    }

    fn write_blob(&self, path: &str, data: &str, directory: Directory) -> Result<WriteFileResult> {
        self.blobs.write(path, data, directory)
    }

    fn to_display_ref(&self, uri: &str) -> String {
        uri.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ImportCamera;
    use crate::storage::FsBlobStore;
    use tempfile::tempdir;

    fn platform(root: &std::path::Path, source: &str) -> WebPlatform {
        let blobs: Arc<dyn BlobStore> =
            Arc::new(FsBlobStore::new(root.join("data"), root.join("cache")));
        let camera = Arc::new(ImportCamera::new(source, blobs.clone()));
        WebPlatform::new(camera, blobs, None)
    }

    #[test]
    fn test_fetch_data_url() {
        let dir = tempdir().unwrap();
        let url = format!("data:image/jpeg;base64,{}", BASE64.encode(b"img"));
        let web = platform(dir.path(), &url);

        let photo = web.capture(&CaptureOptions::default()).unwrap();
        assert_eq!(web.read_transient(&photo).unwrap(), BASE64.encode(b"img"));
    }

    #[test]
    fn test_fetch_file_url() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("pick.jpeg");
        std::fs::write(&source, b"file body").unwrap();
        let web = platform(dir.path(), &format!("file://{}", source.display()));

        let photo = web.capture(&CaptureOptions::default()).unwrap();
        assert_eq!(web.read_transient(&photo).unwrap(), BASE64.encode(b"file body"));
    }

    #[test]
    fn test_plain_data_url_rejected() {
        assert!(decode_data_url("text/plain,hello").is_err());
        assert!(decode_data_url("image/jpeg;base64").is_err());
    }

    #[test]
    fn test_unsupported_scheme() {
        let dir = tempdir().unwrap();
        let web = platform(dir.path(), "https://example.com/a.jpeg");

        let photo = CapturedPhoto {
            web_path: Some("blob:http://localhost/abc".to_string()),
            ..Default::default()
        };
        let err = web.read_transient(&photo).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GalleryError>(),
            Some(GalleryError::UnsupportedUrl(_))
        ));
    }

    #[test]
    fn test_missing_web_path() {
        let dir = tempdir().unwrap();
        let web = platform(dir.path(), "blob:x");
        let err = web.read_transient(&CapturedPhoto::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GalleryError>(),
            Some(GalleryError::MissingWebPath)
        ));
    }

    #[test]
    fn test_display_ref_is_identity() {
        let dir = tempdir().unwrap();
        let web = platform(dir.path(), "blob:x");
        assert_eq!(web.to_display_ref("blob:x"), "blob:x");
    }
}
