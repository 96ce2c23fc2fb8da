//! Error types for the video catalog

use std::path::PathBuf;
use thiserror::Error;

/// Outcome kinds for reading the library cache file.
///
/// Callers branch on the variant: `NotFound` and `Parse` mean "no usable
/// cache, walk the filesystem instead", while `Io` is a hard failure that
/// must reach the caller of the populate cycle.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No cache file exists yet
    #[error("cache file not found")]
    NotFound,
    /// The cache file exists but does not deserialize
    #[error("cache file failed to parse: {0}")]
    Parse(#[from] serde_json::Error),
    /// Any other read failure (permissions, hardware, ...)
    #[error("cache read failed: {0}")]
    Io(std::io::Error),
}

/// Errors surfaced by the library's public operations
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Cache read failure during a populate cycle
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The external metadata prober failed for one file
    #[error("probe failed for {path:?}: {reason}")]
    Probe {
        /// File that was being probed
        path: PathBuf,
        /// Stderr or spawn error from the probing utility
        reason: String,
    },

    /// Thumbnail generation is already in progress for this path and the
    /// retry budget ran out
    #[error("thumbnail generation locked for {0:?}")]
    ThumbnailLocked(PathBuf),

    /// The external frame-extraction utility failed
    #[error("frame extraction failed for {path:?}: {reason}")]
    Extraction {
        /// Video the frame was requested from
        path: PathBuf,
        /// Stderr or spawn error from the extraction utility
        reason: String,
    },

    /// Filesystem error outside the cache (thumbnail directory creation, ...)
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    /// Classify a raw read error: a missing file is `NotFound`, everything
    /// else is a hard `Io` failure.
    pub fn from_read(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            CacheError::NotFound
        } else {
            CacheError::Io(err)
        }
    }

    /// True when the error means "no usable cache" rather than a failure
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, CacheError::NotFound | CacheError::Parse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_read_classification() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(CacheError::from_read(missing), CacheError::NotFound));

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(CacheError::from_read(denied), CacheError::Io(_)));
    }

    #[test]
    fn test_cache_miss_kinds() {
        assert!(CacheError::NotFound.is_cache_miss());
        let parse: CacheError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(parse.is_cache_miss());
        let io = CacheError::Io(std::io::Error::other("disk on fire"));
        assert!(!io.is_cache_miss());
    }
}
