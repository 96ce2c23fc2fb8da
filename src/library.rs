//! The library service
//!
//! [`VideoLibrary`] owns every piece of process-wide mutable state: the
//! in-memory index, the populate-in-progress flag and the thumbnail
//! in-flight set. Each has a single writer; hosts with multiple threads go
//! through the same synchronized methods.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::cache;
use crate::config::LibraryConfig;
use crate::error::LibraryError;
use crate::models::{LibraryIndex, PopulateOutcome, ProbeReport, VideoDetails, VideoEntry};
use crate::probe;
use crate::thumbs::{self, InFlightSet};
use crate::walker;

/// The video catalog service
pub struct VideoLibrary {
    config: LibraryConfig,
    index: Mutex<LibraryIndex>,
    populating: AtomicBool,
    in_flight: InFlightSet,
}

/// Clears the populate flag on every exit path of a cycle
struct PopulateFlag<'a>(&'a AtomicBool);

impl Drop for PopulateFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl VideoLibrary {
    /// Create a library around a configuration
    pub fn new(config: LibraryConfig) -> Self {
        Self {
            config,
            index: Mutex::new(LibraryIndex::default()),
            populating: AtomicBool::new(false),
            in_flight: InFlightSet::default(),
        }
    }

    /// The configuration this library was built with
    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Populate the index, preferring the cache snapshot unless
    /// `force_reload` is set.
    ///
    /// At most one cycle runs at a time; a request arriving during an active
    /// cycle is dropped and signalled as [`PopulateOutcome::AlreadyRunning`].
    /// A missing or corrupt cache falls back to a fresh walk; any other
    /// cache read failure is fatal and propagates.
    pub fn populate_library(&self, force_reload: bool) -> Result<PopulateOutcome, LibraryError> {
        if self.populating.swap(true, Ordering::SeqCst) {
            log::info!("a library populate request is already in progress");
            return Ok(PopulateOutcome::AlreadyRunning);
        }
        let _active = PopulateFlag(&self.populating);

        if !force_reload {
            match cache::load(&self.config.cache_file) {
                Ok(snapshot) => {
                    log::info!(
                        "library populated from cache ({} entries)",
                        snapshot.total_entries()
                    );
                    *self.lock_index() = snapshot;
                    return Ok(PopulateOutcome::LoadedFromCache);
                }
                Err(e) if e.is_cache_miss() => {
                    log::debug!("no usable cache: {}", e);
                }
                Err(e) => {
                    log::error!("library cache read failed: {}", e);
                    return Err(e.into());
                }
            }
        }

        self.lock_index().clear();
        for root in &self.config.roots {
            let root_key = root.to_string_lossy().into_owned();
            walker::walk_root(&root_key, &self.config, |entry| {
                self.lock_index().insert(&root_key, entry);
            });
        }

        let snapshot = self.lock_index().clone();
        log::info!("library walk complete: {} entries", snapshot.total_entries());
        if let Err(e) = cache::save(&self.config.cache_file, &snapshot) {
            log::error!("library cache save failed: {}", e);
        }
        Ok(PopulateOutcome::FreshWalk)
    }

    /// Serializable snapshot of the full index
    pub fn get_libraries(&self) -> LibraryIndex {
        self.lock_index().clone()
    }

    /// True iff the path starts with a configured root prefix and currently
    /// exists on disk
    pub fn is_path_valid(&self, path: &str) -> bool {
        let under_root = self
            .config
            .roots
            .iter()
            .any(|root| path.starts_with(&*root.to_string_lossy()));
        under_root && Path::new(path).exists()
    }

    /// Enrich every entry still lacking details, in index order.
    ///
    /// A checkpoint snapshot is written after every
    /// `checkpoint_interval` successful probes and once more at the end when
    /// the final count is not an exact multiple. The first probe failure
    /// aborts the rest of the batch; everything checkpointed so far is
    /// retained.
    pub fn probe_all(&self) -> Result<ProbeReport, LibraryError> {
        self.probe_pending(|path| probe::video_details(&self.config.ffprobe_bin, path))
    }

    /// Enrich one entry by exact key; `None` when the key is unknown.
    /// An already-enriched entry is returned unchanged without re-probing.
    pub fn probe_one(
        &self,
        root: &str,
        dir: &str,
        name: &str,
    ) -> Result<Option<VideoEntry>, LibraryError> {
        self.probe_single(root, dir, name, |path| {
            probe::video_details(&self.config.ffprobe_bin, path)
        })
    }

    /// Deterministic thumbnail directory for a video path
    pub fn thumbs_dir(&self, path: &str) -> PathBuf {
        thumbs::thumbs_dir(&self.config.thumbs_dir, path)
    }

    /// Generate `1.png` under [`Self::thumbs_dir`] for one video
    pub fn take_screenshots(&self, path: &str) -> Result<PathBuf, LibraryError> {
        thumbs::take_screenshots(&self.config, &self.in_flight, path)
    }

    fn lock_index(&self) -> MutexGuard<'_, LibraryIndex> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn probe_pending<F>(&self, probe_fn: F) -> Result<ProbeReport, LibraryError>
    where
        F: Fn(&str) -> Result<VideoDetails, LibraryError>,
    {
        let pending = self.lock_index().unprobed_keys();
        let interval = self.config.checkpoint_interval.max(1);
        let mut report = ProbeReport::default();

        for key in pending {
            let details = probe_fn(&key.full_path)?;

            let stored = {
                let mut index = self.lock_index();
                match index.entry_mut(&key.root, &key.dir, &key.name) {
                    Some(entry) if entry.details.is_none() => {
                        entry.details = Some(details);
                        true
                    }
                    _ => false,
                }
            };

            if stored {
                report.probed += 1;
                if report.probed % interval == 0 {
                    self.checkpoint(&mut report);
                }
            }
        }

        if report.probed % interval != 0 {
            self.checkpoint(&mut report);
        }
        Ok(report)
    }

    fn checkpoint(&self, report: &mut ProbeReport) {
        let snapshot = self.lock_index().clone();
        match cache::save(&self.config.cache_file, &snapshot) {
            Ok(()) => {
                report.checkpoints += 1;
                log::info!("enrichment checkpoint: {} entries probed", report.probed);
            }
            Err(e) => log::error!("enrichment checkpoint save failed: {}", e),
        }
    }

    fn probe_single<F>(
        &self,
        root: &str,
        dir: &str,
        name: &str,
        probe_fn: F,
    ) -> Result<Option<VideoEntry>, LibraryError>
    where
        F: Fn(&str) -> Result<VideoDetails, LibraryError>,
    {
        let target = {
            let index = self.lock_index();
            match index.entry(root, dir, name) {
                None => return Ok(None),
                Some(entry) if entry.details.is_some() => return Ok(Some(entry.clone())),
                Some(entry) => entry.full_path.clone(),
            }
        };

        let details = probe_fn(&target)?;

        let mut index = self.lock_index();
        match index.entry_mut(root, dir, name) {
            None => Ok(None),
            Some(entry) => {
                if entry.details.is_none() {
                    entry.details = Some(details);
                }
                Ok(Some(entry.clone()))
            }
        }
    }
}
