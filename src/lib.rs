//! Video library indexer with a crash-safe disk cache, lazy metadata
//! enrichment and on-demand thumbnails
//!
//! The catalog is built by recursively walking configured root directories,
//! persisted as a JSON snapshot, and lazily enriched with codec, duration
//! and resolution metadata via an external ffprobe binary. Thumbnails are
//! generated per video on request, guarded against duplicate concurrent
//! work by a per-path in-flight set.

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod library;
pub mod models;
pub mod probe;
pub mod thumbs;
pub mod walker;

pub use config::LibraryConfig;
pub use error::{CacheError, LibraryError};
pub use format::{to_readable_size, to_timestamp};
pub use library::VideoLibrary;
pub use models::{
    EntryKey, LibraryIndex, PopulateOutcome, ProbeReport, VideoCollection, VideoDetails,
    VideoEntry,
};
