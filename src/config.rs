//! Configuration for the video catalog

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default cache checkpoint interval (successful probes between writes)
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 100;

/// Default number of retries while a thumbnail lock is held
pub const DEFAULT_LOCK_RETRIES: u32 = 3;

/// Default wait between thumbnail lock retries (milliseconds)
pub const DEFAULT_LOCK_WAIT_MS: u64 = 250;

/// Height of generated thumbnails in pixels; width is auto-scaled
pub const THUMBNAIL_HEIGHT: u32 = 240;

/// Configuration for the library
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root directories to index
    pub roots: Vec<PathBuf>,

    /// File name suffixes to keep, e.g. `.mp4`
    pub extensions: Vec<String>,

    /// Whether a fresh walk should be followed by batch enrichment
    pub stat_videos: bool,

    /// Path of the cache snapshot file
    pub cache_file: PathBuf,

    /// Directory holding per-video thumbnail folders
    pub thumbs_dir: PathBuf,

    /// Metadata-probing binary
    pub ffprobe_bin: String,

    /// Frame-extraction binary
    pub ffmpeg_bin: String,

    /// Image-compression binary
    pub pngquant_bin: String,

    /// Successful probes between cache checkpoints
    pub checkpoint_interval: usize,

    /// Retries while a thumbnail lock is held
    pub lock_retries: u32,

    /// Wait between thumbnail lock retries (milliseconds)
    pub lock_wait_ms: u64,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            extensions: Self::default_extensions(),
            stat_videos: false,
            cache_file: PathBuf::from("_library-cache.json"),
            thumbs_dir: PathBuf::from("_thumbs"),
            ffprobe_bin: "ffprobe".to_string(),
            ffmpeg_bin: "ffmpeg".to_string(),
            pngquant_bin: "pngquant".to_string(),
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            lock_retries: DEFAULT_LOCK_RETRIES,
            lock_wait_ms: DEFAULT_LOCK_WAIT_MS,
        }
    }
}

impl LibraryConfig {
    /// Create a new config with the given root directories
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ..Default::default()
        }
    }

    /// Create a config builder
    pub fn builder() -> LibraryConfigBuilder {
        LibraryConfigBuilder::new()
    }

    /// Read a config from a JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(std::io::Error::other)
    }

    /// Default video suffixes
    pub fn default_extensions() -> Vec<String> {
        [".mp4", ".mkv", ".avi", ".webm", ".mov", ".m4v", ".wmv", ".flv"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Check whether a file name carries one of the configured suffixes
    pub fn keeps_file(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| name.ends_with(ext))
    }

    /// Wait between thumbnail lock retries
    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms)
    }
}

/// Builder for LibraryConfig
#[derive(Debug, Default)]
pub struct LibraryConfigBuilder {
    config: LibraryConfig,
}

impl LibraryConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root directories
    pub fn roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.config.roots = roots;
        self
    }

    /// Add a root directory
    pub fn add_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.roots.push(root.into());
        self
    }

    /// Set the suffix whitelist
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.extensions = extensions;
        self
    }

    /// Enable or disable enrichment after a fresh walk
    pub fn stat_videos(mut self, enabled: bool) -> Self {
        self.config.stat_videos = enabled;
        self
    }

    /// Set the cache snapshot path
    pub fn cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cache_file = path.into();
        self
    }

    /// Set the thumbnail cache root
    pub fn thumbs_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.thumbs_dir = path.into();
        self
    }

    /// Set the checkpoint interval
    pub fn checkpoint_interval(mut self, interval: usize) -> Self {
        self.config.checkpoint_interval = interval;
        self
    }

    /// Set the thumbnail lock backoff policy
    pub fn lock_backoff(mut self, retries: u32, wait_ms: u64) -> Self {
        self.config.lock_retries = retries;
        self.config.lock_wait_ms = wait_ms;
        self
    }

    /// Build the config
    pub fn build(self) -> LibraryConfig {
        self.config
    }
}
