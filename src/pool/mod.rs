//! Image pool subsystem.
//!
//! # Data Flow
//! ```text
//! startup
//!     → store.rs (scan directory once, filter by extension)
//!     → Arc<ImagePool> (read-only, shared by every connection)
//!
//! per substitution:
//!     → pick uniformly at random
//!     → entry.rs (read bytes, derive content type, build data URI)
//! ```
//!
//! # Design Decisions
//! - Discovered once; never refreshed while serving, so no locking
//! - Read failures are local: the caller skips that substitution

pub mod entry;
pub mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use entry::{ImageEntry, ImageMime, LoadedImage};
pub use store::ImagePool;

/// Errors raised while scanning or reading pool files.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to scan image directory {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read image {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
