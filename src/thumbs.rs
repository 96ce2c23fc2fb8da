//! On-demand thumbnail generation
//!
//! Each video maps to a deterministic folder (SHA-256 of its path) under the
//! configured thumbnail root, holding a single `1.png`. Duplicate concurrent
//! requests for the same path are serialized through an in-flight set with a
//! bounded backoff, not deduplicated: the second request regenerates after
//! the first releases.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use crate::config::{LibraryConfig, THUMBNAIL_HEIGHT};
use crate::error::LibraryError;

/// Deterministic thumbnail directory for a video path
pub fn thumbs_dir(thumbs_root: &Path, path: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    thumbs_root.join(format!("{:x}", hasher.finalize()))
}

/// Process-wide set of paths currently undergoing thumbnail generation.
///
/// Waiters park on a condvar and are woken when any holder releases; each
/// wait is bounded so the total budget stays `retries * wait` even if the
/// holder never finishes.
#[derive(Debug, Default)]
pub struct InFlightSet {
    paths: Mutex<HashSet<String>>,
    freed: Condvar,
}

/// Claim on one path; releases and wakes waiters on drop
#[derive(Debug)]
pub struct InFlightClaim<'a> {
    set: &'a InFlightSet,
    path: String,
}

impl InFlightSet {
    /// Claim a path, waiting out the backoff budget when it is already held
    pub fn acquire(
        &self,
        path: &str,
        retries: u32,
        wait: Duration,
    ) -> Result<InFlightClaim<'_>, LibraryError> {
        let mut held = self.paths.lock().unwrap_or_else(PoisonError::into_inner);

        let mut attempts = 0;
        while held.contains(path) {
            if attempts >= retries {
                return Err(LibraryError::ThumbnailLocked(path.into()));
            }
            held = self
                .freed
                .wait_timeout(held, wait)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
            attempts += 1;
        }

        held.insert(path.to_string());
        Ok(InFlightClaim {
            set: self,
            path: path.to_string(),
        })
    }
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        let mut held = self
            .set
            .paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        held.remove(&self.path);
        self.set.freed.notify_all();
    }
}

/// Generate `{thumbs_dir(path)}/1.png` for one video and return its path.
///
/// Fails with [`LibraryError::ThumbnailLocked`] when another request holds
/// the path beyond the retry budget, and with [`LibraryError::Extraction`]
/// when the frame extractor fails. Compression is best-effort: the frame is
/// replaced only when the compressed output is strictly smaller.
pub fn take_screenshots(
    config: &LibraryConfig,
    in_flight: &InFlightSet,
    path: &str,
) -> Result<PathBuf, LibraryError> {
    let _claim = in_flight.acquire(path, config.lock_retries, config.lock_wait())?;

    let folder = thumbs_dir(&config.thumbs_dir, path);
    std::fs::create_dir_all(&folder)?;

    let thumb = extract_frame(&config.ffmpeg_bin, path, &folder)?;
    compress_frame(&config.pngquant_bin, &thumb);
    Ok(thumb)
}

/// Extract a single frame, height-bound with auto-scaled width
fn extract_frame(ffmpeg_bin: &str, video: &str, folder: &Path) -> Result<PathBuf, LibraryError> {
    let target = folder.join("1.png");
    let extraction_err = |reason: String| LibraryError::Extraction {
        path: video.into(),
        reason,
    };

    let output = Command::new(ffmpeg_bin)
        .args(["-y", "-v", "error", "-i"])
        .arg(video)
        .args([
            "-vf",
            &format!("scale=-1:{}", THUMBNAIL_HEIGHT),
            "-frames:v",
            "1",
        ])
        .arg(&target)
        .output()
        .map_err(|e| extraction_err(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(extraction_err(stderr));
    }
    Ok(target)
}

/// Recompress the frame in place when that makes it smaller; keep the
/// original on any compression failure
fn compress_frame(pngquant_bin: &str, thumb: &Path) {
    let compressed = thumb.with_file_name("1.compressed.png");
    let run = Command::new(pngquant_bin)
        .args(["--force", "--output"])
        .arg(&compressed)
        .arg("--")
        .arg(thumb)
        .output();

    match run {
        Ok(output) if output.status.success() => {
            let smaller = match (std::fs::metadata(&compressed), std::fs::metadata(thumb)) {
                (Ok(new), Ok(old)) => new.len() < old.len(),
                _ => false,
            };
            if smaller {
                if let Err(e) = std::fs::rename(&compressed, thumb) {
                    log::debug!("could not swap in compressed thumbnail: {}", e);
                }
            } else {
                let _ = std::fs::remove_file(&compressed);
            }
        }
        Ok(output) => {
            log::debug!(
                "pngquant exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            let _ = std::fs::remove_file(&compressed);
        }
        Err(e) => log::debug!("pngquant not invoked: {}", e),
    }
}
