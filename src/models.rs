//! Core data models for the video catalog

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Probed metadata for one video file.
///
/// Either fully populated by a successful probe or absent from the entry;
/// never partial. The pre-formatted `duration`/`size`/`resolution` strings
/// are part of the persisted snapshot format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    /// Container duration in seconds
    pub duration_in_secs: f64,
    /// Duration formatted as `HH:MM:SS` (or `00:00` for zero)
    pub duration: String,
    /// Container size in bytes
    pub size_in_bytes: u64,
    /// Size formatted with a decimal unit, e.g. `1.50 KB`
    pub size: String,
    /// Codec name of the first video stream, empty when none
    pub codec: String,
    /// Frame width in pixels, 0 when unknown
    pub width: u32,
    /// Frame height in pixels, 0 when unknown
    pub height: u32,
    /// `{width}x{height}`
    pub resolution: String,
}

/// One discovered video file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
    /// File name including extension
    pub name: String,
    /// Root joined with the path relative to it
    pub full_path: String,
    /// Probed metadata, `None` until enrichment runs
    pub details: Option<VideoDetails>,
}

impl VideoEntry {
    /// Create an unenriched entry for a discovered file
    pub fn new(name: impl Into<String>, full_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            details: None,
        }
    }

    /// Parent directory of the entry's full path
    pub fn parent_dir(&self) -> String {
        Path::new(&self.full_path)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Ordered mapping from parent directory to the entries discovered beneath
/// it. Directory order and entry order both follow discovery order; the
/// serialized form is the sequence of `(directory, entries)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoCollection {
    dirs: Vec<(String, Vec<VideoEntry>)>,
}

impl VideoCollection {
    /// Append an entry under its parent directory, creating the directory
    /// bucket on first use
    pub fn push(&mut self, dir: &str, entry: VideoEntry) {
        match self.dirs.iter_mut().find(|(d, _)| d == dir) {
            Some((_, entries)) => entries.push(entry),
            None => self.dirs.push((dir.to_string(), vec![entry])),
        }
    }

    /// Entries under one directory
    pub fn get(&self, dir: &str) -> Option<&[VideoEntry]> {
        self.dirs
            .iter()
            .find(|(d, _)| d == dir)
            .map(|(_, entries)| entries.as_slice())
    }

    /// Iterate directories in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[VideoEntry])> {
        self.dirs
            .iter()
            .map(|(dir, entries)| (dir.as_str(), entries.as_slice()))
    }

    /// Number of directories
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// True when no directory has been recorded
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    fn entry_mut(&mut self, dir: &str, name: &str) -> Option<&mut VideoEntry> {
        self.dirs
            .iter_mut()
            .find(|(d, _)| d == dir)?
            .1
            .iter_mut()
            .find(|entry| entry.name == name)
    }
}

/// The in-memory catalog: ordered mapping from root path to its collection.
///
/// The serialized form, a sequence of `(root, collection)` pairs, is
/// exactly the on-disk cache snapshot, so serialize-then-deserialize
/// restores roots, directories and entry order unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibraryIndex {
    roots: Vec<(String, VideoCollection)>,
}

impl LibraryIndex {
    /// Insert a discovered entry under its root, creating the root's
    /// collection on first discovery
    pub fn insert(&mut self, root: &str, entry: VideoEntry) {
        let dir = entry.parent_dir();
        let pos = match self.roots.iter().position(|(r, _)| r == root) {
            Some(pos) => pos,
            None => {
                self.roots
                    .push((root.to_string(), VideoCollection::default()));
                self.roots.len() - 1
            }
        };
        self.roots[pos].1.push(&dir, entry);
    }

    /// Collection for one root
    pub fn collection(&self, root: &str) -> Option<&VideoCollection> {
        self.roots
            .iter()
            .find(|(r, _)| r == root)
            .map(|(_, collection)| collection)
    }

    /// Exact-key entry lookup
    pub fn entry(&self, root: &str, dir: &str, name: &str) -> Option<&VideoEntry> {
        self.collection(root)?
            .get(dir)?
            .iter()
            .find(|entry| entry.name == name)
    }

    /// Exact-key mutable entry lookup
    pub fn entry_mut(&mut self, root: &str, dir: &str, name: &str) -> Option<&mut VideoEntry> {
        self.roots
            .iter_mut()
            .find(|(r, _)| r == root)?
            .1
            .entry_mut(dir, name)
    }

    /// Iterate roots in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VideoCollection)> {
        self.roots
            .iter()
            .map(|(root, collection)| (root.as_str(), collection))
    }

    /// Keys of every entry still lacking details, in index order
    pub fn unprobed_keys(&self) -> Vec<EntryKey> {
        let mut keys = Vec::new();
        for (root, collection) in self.iter() {
            for (dir, entries) in collection.iter() {
                for entry in entries {
                    if entry.details.is_none() {
                        keys.push(EntryKey {
                            root: root.to_string(),
                            dir: dir.to_string(),
                            name: entry.name.clone(),
                            full_path: entry.full_path.clone(),
                        });
                    }
                }
            }
        }
        keys
    }

    /// Total number of entries across all roots
    pub fn total_entries(&self) -> usize {
        self.iter()
            .flat_map(|(_, collection)| collection.iter())
            .map(|(_, entries)| entries.len())
            .sum()
    }

    /// Drop every root and entry (forced rebuild)
    pub fn clear(&mut self) {
        self.roots.clear();
    }

    /// True when no root has been recorded
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Addressing tuple for one entry, captured while walking the index
#[derive(Debug, Clone, PartialEq)]
pub struct EntryKey {
    /// Root the entry was discovered under
    pub root: String,
    /// Parent directory key
    pub dir: String,
    /// File name
    pub name: String,
    /// Full path, kept so the prober does not need a second lookup
    pub full_path: String,
}

/// Result of a populate cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulateOutcome {
    /// Another populate cycle is active; this request was dropped
    AlreadyRunning,
    /// The snapshot was adopted from the cache file, no walk performed
    LoadedFromCache,
    /// The roots were re-walked and a new snapshot written
    FreshWalk,
}

/// Counters from a batch enrichment run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Entries enriched during this run
    pub probed: usize,
    /// Cache checkpoints written during this run
    pub checkpoints: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, full_path: &str) -> VideoEntry {
        VideoEntry::new(name, full_path)
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(entry("a.mp4", "/videos/x/a.mp4").parent_dir(), "/videos/x");
        assert_eq!(entry("a.mp4", "/videos/a.mp4").parent_dir(), "/videos");
    }

    #[test]
    fn test_insert_preserves_discovery_order() {
        let mut index = LibraryIndex::default();
        index.insert("/videos", entry("b.mp4", "/videos/z/b.mp4"));
        index.insert("/videos", entry("a.mp4", "/videos/z/a.mp4"));
        index.insert("/videos", entry("c.mp4", "/videos/a/c.mp4"));
        index.insert("/other", entry("d.mp4", "/other/d.mp4"));

        let roots: Vec<&str> = index.iter().map(|(root, _)| root).collect();
        assert_eq!(roots, vec!["/videos", "/other"]);

        let collection = index.collection("/videos").unwrap();
        let dirs: Vec<&str> = collection.iter().map(|(dir, _)| dir).collect();
        assert_eq!(dirs, vec!["/videos/z", "/videos/a"]);

        let names: Vec<&str> = collection.get("/videos/z").unwrap()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["b.mp4", "a.mp4"]);
    }

    #[test]
    fn test_entry_lookup() {
        let mut index = LibraryIndex::default();
        index.insert("/videos", entry("a.mp4", "/videos/x/a.mp4"));

        assert!(index.entry("/videos", "/videos/x", "a.mp4").is_some());
        assert!(index.entry("/videos", "/videos/x", "b.mp4").is_none());
        assert!(index.entry("/videos", "/videos/y", "a.mp4").is_none());
        assert!(index.entry("/nope", "/videos/x", "a.mp4").is_none());
    }

    #[test]
    fn test_unprobed_keys_skip_enriched() {
        let mut index = LibraryIndex::default();
        index.insert("/videos", entry("a.mp4", "/videos/a.mp4"));
        index.insert("/videos", entry("b.mp4", "/videos/b.mp4"));
        index
            .entry_mut("/videos", "/videos", "a.mp4")
            .unwrap()
            .details = Some(sample_details());

        let keys = index.unprobed_keys();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].name, "b.mp4");
        assert_eq!(keys[0].full_path, "/videos/b.mp4");
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut index = LibraryIndex::default();
        index.insert("/videos", entry("b.mp4", "/videos/z/b.mp4"));
        index.insert("/videos", entry("a.mp4", "/videos/z/a.mp4"));
        index
            .entry_mut("/videos", "/videos/z", "a.mp4")
            .unwrap()
            .details = Some(sample_details());

        let serialized = serde_json::to_string(&index).unwrap();
        let restored: LibraryIndex = serde_json::from_str(&serialized).unwrap();
        assert_eq!(index, restored);
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let serialized = serde_json::to_string(&entry("a.mp4", "/videos/a.mp4")).unwrap();
        assert!(serialized.contains("\"fullPath\""));
        assert!(serialized.contains("\"details\":null"));
    }

    fn sample_details() -> VideoDetails {
        VideoDetails {
            duration_in_secs: 3661.0,
            duration: "01:01:01".to_string(),
            size_in_bytes: 1500,
            size: "1.50 KB".to_string(),
            codec: "h264".to_string(),
            width: 1920,
            height: 1080,
            resolution: "1920x1080".to_string(),
        }
    }
}
