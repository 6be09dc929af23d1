//! The process-wide image pool.

use std::io::ErrorKind;
use std::path::Path;

use crate::pool::entry::{has_image_extension, ImageEntry, LoadedImage};
use crate::pool::PoolError;
use crate::random::Coin;

/// Read-only set of candidate images, built once before serving.
#[derive(Debug, Clone, Default)]
pub struct ImagePool {
    entries: Vec<ImageEntry>,
}

impl ImagePool {
    /// Scan `dir` (non-recursively) for image files.
    ///
    /// A missing directory yields an empty pool. Entries are sorted by path.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, PoolError> {
        let dir = dir.as_ref();
        let read_dir = match std::fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(directory = %dir.display(), "Image directory not found, pool is empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(PoolError::Scan {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        };

        let mut entries = Vec::new();
        for item in read_dir {
            let item = item.map_err(|source| PoolError::Scan {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = item.path();

            // Follows symlinks; directories and dangling links are skipped.
            let is_file = std::fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false);
            if is_file && has_image_extension(&path) {
                entries.push(ImageEntry::new(path));
            }
        }
        entries.sort_by(|a, b| a.path().cmp(b.path()));

        tracing::info!(
            directory = %dir.display(),
            images = entries.len(),
            "Image pool discovered"
        );

        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<ImageEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    /// Uniform random choice; `None` for an empty pool.
    pub fn pick(&self, coin: &mut dyn Coin) -> Option<&ImageEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.entries.get(coin.pick(self.entries.len()))
    }

    /// Pick an entry and read it.
    ///
    /// `Ok(None)` means the pool is empty.
    pub fn load_random(&self, coin: &mut dyn Coin) -> Result<Option<LoadedImage>, PoolError> {
        match self.pick(coin) {
            Some(entry) => entry.load().map(Some),
            None => Ok(None),
        }
    }
}
