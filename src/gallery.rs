//! Photo gallery state and the two operations that drive it.
//!
//! A [`PhotoGallery`] owns the in-memory photo list. [`PhotoGallery::load_saved`]
//! rebuilds it from the stored manifest; [`PhotoGallery::take_photo`] captures,
//! saves and prepends a new photo, then writes the manifest back with
//! [`PhotoGallery::persist`].
//!
//! Nothing coordinates separate handles that share a key-value store: each
//! one writes its own full list, so the last writer wins.

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;

use crate::camera::{CaptureOptions, CapturedPhoto};
use crate::photo::{decode_manifest, encode_manifest, file_name_at, jpeg_data_url, UserPhoto};
use crate::platform::{Platform, PlatformKind};
use crate::storage::{Directory, KeyValueStore};

pub struct PhotoGallery {
    platform: Arc<dyn Platform>,
    store: Arc<dyn KeyValueStore>,
    manifest_key: String,
    capture_options: CaptureOptions,
    photos: Vec<UserPhoto>,
}

impl PhotoGallery {
    pub fn new(
        platform: Arc<dyn Platform>,
        store: Arc<dyn KeyValueStore>,
        manifest_key: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            store,
            manifest_key: manifest_key.into(),
            capture_options: CaptureOptions::default(),
            photos: Vec::new(),
        }
    }

    pub fn with_capture_options(mut self, options: CaptureOptions) -> Self {
        self.capture_options = options;
        self
    }

    /// Current photos, newest first
    pub fn photos(&self) -> &[UserPhoto] {
        &self.photos
    }

    /// Raw manifest as stored, if any
    pub fn stored_manifest(&self) -> Result<Option<String>> {
        self.store.get(&self.manifest_key)
    }

    /// Replace the in-memory list with the stored manifest.
    ///
    /// On the web every photo's display reference is rebuilt from its blob,
    /// since transient URLs do not survive a reload. Hybrid references are
    /// kept as stored.
    pub fn load_saved(&mut self) -> Result<()> {
        let raw = self.store.get(&self.manifest_key)?;
        let mut photos = decode_manifest(raw.as_deref())?;

        if !self.platform.kind().is_hybrid() {
            for photo in &mut photos {
                let data = self
                    .platform
                    .read_blob(&photo.filepath, Some(Directory::Data))
                    .with_context(|| format!("Failed to load saved photo {}", photo.filepath))?;
                photo.webview_path = Some(jpeg_data_url(&data));
            }
        }

        tracing::info!(
            count = photos.len(),
            platform = %self.platform.kind(),
            "Loaded saved photos"
        );

        self.photos = photos;
        Ok(())
    }

    /// Capture a photo, save it, and put it at the front of the gallery.
    pub fn take_photo(&mut self) -> Result<&UserPhoto> {
        let captured = self.platform.capture(&self.capture_options)?;
        let file_name = file_name_at(Utc::now());
        let saved = self.save_picture(&captured, &file_name)?;

        tracing::info!(filepath = %saved.filepath, "Saved new photo");

        self.photos.insert(0, saved);
        self.persist()?;
        Ok(&self.photos[0])
    }

    /// Write the full photo list to the key-value store.
    pub fn persist(&self) -> Result<()> {
        let manifest = encode_manifest(&self.photos)?;
        self.store
            .set(&self.manifest_key, &manifest)
            .context("Failed to store photo manifest")?;
        tracing::debug!(count = self.photos.len(), "Persisted photo manifest");
        Ok(())
    }

    fn save_picture(&self, photo: &CapturedPhoto, file_name: &str) -> Result<UserPhoto> {
        let data = self.platform.read_transient(photo)?;
        let saved = self
            .platform
            .write_blob(file_name, &data, Directory::Data)?;

        match self.platform.kind() {
            PlatformKind::Hybrid => {
                let display = self.platform.to_display_ref(&saved.uri);
                Ok(UserPhoto::new(saved.uri, Some(display)))
            }
            // The transient URL is already loaded; no need to decode the new blob.
            PlatformKind::Web => Ok(UserPhoto::new(file_name, photo.web_path.clone())),
        }
    }
}
