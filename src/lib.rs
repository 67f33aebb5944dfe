//! Capture photos, keep them in private storage and reload the gallery on
//! start, on either a native (hybrid) shell or a plain browser.

pub mod camera;
pub mod config;
pub mod error;
pub mod gallery;
pub mod logging;
pub mod photo;
pub mod platform;
pub mod storage;

pub use config::Config;
pub use error::GalleryError;
pub use gallery::PhotoGallery;
pub use photo::UserPhoto;
pub use platform::{create_platform, Platform, PlatformKind};
