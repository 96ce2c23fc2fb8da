//! Recursive filesystem discovery
//!
//! One root at a time: the caller drives roots strictly sequentially to
//! bound concurrent I/O. Errors on individual filesystem entries (permission
//! denied, broken symlinks, ...) are ignored as a blanket policy and the
//! traversal continues.

use walkdir::WalkDir;

use crate::config::LibraryConfig;
use crate::models::VideoEntry;

/// Recursively enumerate one root and hand every kept file to `on_file` in
/// discovery order. Entries are sorted by file name at each level so the
/// order is reproducible across runs.
pub fn walk_root<F>(root: &str, config: &LibraryConfig, mut on_file: F)
where
    F: FnMut(VideoEntry),
{
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("ignoring walk error under {}: {}", root, e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !config.keeps_file(&name) {
            continue;
        }

        let full_path = entry.path().to_string_lossy().into_owned();
        on_file(VideoEntry::new(name, full_path));
    }
}
