//! Disk-backed persistence for the library index
//!
//! The index serializes as an ordered sequence of `(root, collection)`
//! pairs. Writes run inside a critical section that defers SIGTERM/SIGINT
//! until the file is fully written, so a termination requested mid-save can
//! never leave a partial cache behind.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

use crate::error::CacheError;
use crate::models::LibraryIndex;

/// Read and deserialize the cache snapshot.
///
/// A missing file maps to [`CacheError::NotFound`] and a malformed one to
/// [`CacheError::Parse`]; both mean "walk the filesystem instead". Any other
/// read failure is [`CacheError::Io`] and must propagate.
pub fn load(path: &Path) -> Result<LibraryIndex, CacheError> {
    let raw = std::fs::read_to_string(path).map_err(CacheError::from_read)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Serialize the index to the cache file.
///
/// A save of an empty index is a silent no-op. Termination signals arriving
/// while the file is being written are deferred and replayed once the write
/// completes.
pub fn save(path: &Path, index: &LibraryIndex) -> std::io::Result<()> {
    if index.is_empty() {
        return Ok(());
    }

    let serialized = serde_json::to_vec(index).map_err(std::io::Error::other)?;
    let _section = fence().enter();
    std::fs::write(path, serialized)
}

/// Process-wide signal fence, installed on first cache write.
///
/// Two flag actions are registered per signal, in order: a conditional
/// shutdown that exits immediately while `passthrough` is set (the normal
/// disposition), and a recorder that marks the termination as `deferred`.
/// Inside a critical section `passthrough` is cleared, so only the recorder
/// runs.
struct ShutdownFence {
    passthrough: Arc<AtomicBool>,
    deferred: Arc<AtomicBool>,
}

struct CriticalSection<'a> {
    fence: &'a ShutdownFence,
}

fn fence() -> &'static ShutdownFence {
    static FENCE: OnceLock<ShutdownFence> = OnceLock::new();
    FENCE.get_or_init(ShutdownFence::install)
}

impl ShutdownFence {
    fn install() -> Self {
        let passthrough = Arc::new(AtomicBool::new(true));
        let deferred = Arc::new(AtomicBool::new(false));

        for signal in [SIGTERM, SIGINT] {
            if let Err(e) =
                flag::register_conditional_shutdown(signal, 0, Arc::clone(&passthrough))
            {
                log::warn!("failed to register shutdown handler for {}: {}", signal, e);
                continue;
            }
            if let Err(e) = flag::register(signal, Arc::clone(&deferred)) {
                log::warn!("failed to register deferral flag for {}: {}", signal, e);
            }
        }

        Self {
            passthrough,
            deferred,
        }
    }

    fn enter(&self) -> CriticalSection<'_> {
        self.passthrough.store(false, Ordering::SeqCst);
        CriticalSection { fence: self }
    }
}

impl Drop for CriticalSection<'_> {
    fn drop(&mut self) {
        self.fence.passthrough.store(true, Ordering::SeqCst);
        if self.fence.deferred.swap(false, Ordering::SeqCst) {
            log::warn!("termination was requested during a cache write, shutting down now");
            std::process::exit(0);
        }
    }
}
