//! Directory-backed blob store.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use url::Url;

use super::{BlobStore, Directory, WriteFileResult};
use crate::error::GalleryError;

const FILE_SCHEME: &str = "file://";

/// Blob store rooted at one host directory per [`Directory`].
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    data_dir: PathBuf,
    cache_dir: PathBuf,
}

impl FsBlobStore {
    pub fn new(data_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Host directory backing `directory`
    pub fn root(&self, directory: Directory) -> &Path {
        match directory {
            Directory::Data => &self.data_dir,
            Directory::Cache => &self.cache_dir,
        }
    }

    /// Resolve a relative blob path inside `directory`.
    /// Anything other than plain path segments is refused.
    fn resolve(&self, path: &str, directory: Directory) -> Result<PathBuf> {
        let relative = Path::new(path);
        let plain = relative.components().next().is_some()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(GalleryError::PathOutsideDirectory(path.to_string()).into());
        }
        Ok(self.root(directory).join(relative))
    }
}

/// Percent-encoded `file://` URI for an absolute host path
pub fn file_uri(path: &Path) -> Result<String> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|_| anyhow::Error::from(GalleryError::PathOutsideDirectory(path.display().to_string())))
}

/// Host path named by an absolute path or `file://` URI
pub fn path_from_uri(uri: &str) -> Option<PathBuf> {
    if uri.starts_with(FILE_SCHEME) {
        return Url::parse(uri).ok()?.to_file_path().ok();
    }
    let path = PathBuf::from(uri);
    if path.is_absolute() {
        Some(path)
    } else {
        None
    }
}

fn read_base64(path: &Path) -> Result<String> {
    match fs::read(path) {
        Ok(bytes) => Ok(BASE64.encode(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(GalleryError::BlobNotFound(path.to_path_buf()).into())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read blob {}", path.display())),
    }
}

impl BlobStore for FsBlobStore {
    fn write(&self, path: &str, data: &str, directory: Directory) -> Result<WriteFileResult> {
        let target = self.resolve(path, directory)?;
        let bytes = BASE64
            .decode(data)
            .with_context(|| format!("Blob data for {} is not valid base64", path))?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {} directory", directory))?;
        }
        fs::write(&target, &bytes)
            .with_context(|| format!("Failed to write blob {}", target.display()))?;

        tracing::debug!(path = %target.display(), bytes = bytes.len(), "Wrote blob");

        let absolute = fs::canonicalize(&target).unwrap_or(target);
        Ok(WriteFileResult {
            uri: file_uri(&absolute)?,
        })
    }

    fn read(&self, path: &str, directory: Option<Directory>) -> Result<String> {
        let source = match directory {
            Some(directory) => self.resolve(path, directory)?,
            None => path_from_uri(path)
                .ok_or_else(|| GalleryError::PathOutsideDirectory(path.to_string()))?,
        };
        read_base64(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(root: &Path) -> FsBlobStore {
        FsBlobStore::new(root.join("data"), root.join("cache"))
    }

    #[test]
    fn test_write_then_read_in_directory() {
        let dir = tempdir().unwrap();
        let blobs = store(dir.path());

        let data = BASE64.encode(b"\xff\xd8jpeg bytes");
        let written = blobs.write("1.jpeg", &data, Directory::Data).unwrap();

        assert!(written.uri.starts_with("file:///"));
        assert!(written.uri.ends_with("/data/1.jpeg"));
        assert_eq!(
            fs::read(dir.path().join("data/1.jpeg")).unwrap(),
            b"\xff\xd8jpeg bytes"
        );
        assert_eq!(blobs.read("1.jpeg", Some(Directory::Data)).unwrap(), data);
    }

    #[test]
    fn test_read_by_uri_without_directory() {
        let dir = tempdir().unwrap();
        let blobs = store(dir.path());

        let written = blobs
            .write("shot.jpeg", &BASE64.encode(b"abc"), Directory::Cache)
            .unwrap();

        assert_eq!(blobs.read(&written.uri, None).unwrap(), BASE64.encode(b"abc"));
    }

    #[test]
    fn test_relative_path_without_directory_is_rejected() {
        let dir = tempdir().unwrap();
        let err = store(dir.path()).read("1.jpeg", None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GalleryError>(),
            Some(GalleryError::PathOutsideDirectory(_))
        ));
    }

    #[test]
    fn test_parent_components_are_rejected() {
        let dir = tempdir().unwrap();
        let blobs = store(dir.path());
        assert!(blobs
            .write("../escape.jpeg", &BASE64.encode(b"x"), Directory::Data)
            .is_err());
        assert!(blobs.read("/etc/passwd", Some(Directory::Data)).is_err());
    }

    #[test]
    fn test_missing_blob() {
        let dir = tempdir().unwrap();
        let err = store(dir.path())
            .read("missing.jpeg", Some(Directory::Data))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GalleryError>(),
            Some(GalleryError::BlobNotFound(_))
        ));
    }

    #[test]
    fn test_uri_is_percent_encoded() {
        let dir = tempdir().unwrap();
        let blobs = store(&dir.path().join("my photos #1"));

        let written = blobs
            .write("1.jpeg", &BASE64.encode(b"abc"), Directory::Data)
            .unwrap();

        assert!(written.uri.ends_with("/my%20photos%20%231/data/1.jpeg"));
        assert!(!written.uri.contains(' '));
        assert_eq!(blobs.read(&written.uri, None).unwrap(), BASE64.encode(b"abc"));
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let dir = tempdir().unwrap();
        assert!(store(dir.path())
            .write("1.jpeg", "not base64!", Directory::Data)
            .is_err());
    }
}
