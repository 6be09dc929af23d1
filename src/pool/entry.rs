//! A single candidate image and its content type.

use std::fmt;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::pool::PoolError;

/// Image content type derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Jpeg,
    Png,
    Gif,
}

impl ImageMime {
    /// Derive the type from a path's extension, case-insensitively.
    ///
    /// `.jpg`/`.jpeg` map to JPEG, `.png` to PNG, anything else to GIF.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => ImageMime::Jpeg,
            Some("png") => ImageMime::Png,
            _ => ImageMime::Gif,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Gif => "image/gif",
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extensions accepted during discovery (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Whether `path` carries one of the accepted image extensions.
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|known| e.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// A file location in the pool. Immutable after discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    path: PathBuf,
    mime: ImageMime,
}

impl ImageEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime = ImageMime::from_path(&path);
        Self { path, mime }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    /// Read the file contents.
    ///
    /// Fails if the file disappeared after discovery; callers skip the
    /// substitution in that case.
    pub fn load(&self) -> Result<LoadedImage, PoolError> {
        let bytes = std::fs::read(&self.path).map_err(|source| PoolError::Read {
            path: self.path.clone(),
            source,
        })?;

        Ok(LoadedImage {
            mime: self.mime,
            bytes,
        })
    }
}

/// Bytes of a pool image, ready to be embedded or served.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub mime: ImageMime,
    pub bytes: Vec<u8>,
}

impl LoadedImage {
    /// `data:<mime>;base64,<payload>`
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}
