// Cache path utilities.
// Constructs filesystem paths for cache partitions and their entries.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Get the base cache directory (~/.cache/commitview on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "commitview").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to a named partition under `root`.
pub fn partition_dir(root: &Path, partition: &str) -> PathBuf {
    root.join(encode_name(partition))
}

/// Path to the entry stored for `key` in a partition directory.
pub fn entry_path(partition_dir: &Path, key: &str) -> PathBuf {
    partition_dir.join(format!("{}.json", encode_name(key)))
}

/// Encode a name for use as a single path component.
///
/// Every byte outside `[A-Za-z0-9.-]` becomes `%XX`, so distinct names never
/// share a file.
fn encode_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for b in name.bytes() {
        if b.is_ascii_alphanumeric() || b == b'.' || b == b'-' {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{:02X}", b);
        }
    }
    out
}
