//! Per-document cache for the reading position and display parameters.
//!
//! Files live under `<cache root>/<sha256 of the document path>/` so arbitrary
//! document names never hit filesystem limits. Both files are small TOML
//! documents; write errors are logged and otherwise ignored.

use crate::pagination::DisplayParams;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CACHE_DIR: &str = ".cache";
const BOOKMARK_FILE: &str = "bookmark.toml";
const DISPLAY_FILE: &str = "display.toml";

/// Resume point for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub page: usize,
    /// First pair of the bookmarked page; survives re-pagination.
    #[serde(default)]
    pub pair_idx: Option<usize>,
}

pub fn hash_dir(cache_root: &Path, document: &Path) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(document.as_os_str().to_string_lossy().as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    cache_root.join(hash)
}

pub fn load_bookmark(cache_root: &Path, document: &Path) -> Option<Bookmark> {
    read_toml(&hash_dir(cache_root, document).join(BOOKMARK_FILE))
}

pub fn save_bookmark(cache_root: &Path, document: &Path, bookmark: &Bookmark) {
    write_toml(&hash_dir(cache_root, document).join(BOOKMARK_FILE), bookmark);
}

/// Cached font size and margin, clamped on the way in.
pub fn load_display_params(cache_root: &Path, document: &Path) -> Option<DisplayParams> {
    read_toml::<DisplayParams>(&hash_dir(cache_root, document).join(DISPLAY_FILE))
        .map(DisplayParams::clamped)
}

pub fn save_display_params(cache_root: &Path, document: &Path, params: &DisplayParams) {
    write_toml(&hash_dir(cache_root, document).join(DISPLAY_FILE), params);
}

fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Option<T> {
    let data = fs::read_to_string(path).ok()?;
    match toml::from_str(&data) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path = %path.display(), "Ignoring unreadable cache file: {err}");
            None
        }
    }
}

fn write_toml<T: Serialize>(path: &Path, value: &T) {
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            warn!(path = %parent.display(), "Failed to create cache directory: {err}");
            return;
        }
    }
    match toml::to_string(value) {
        Ok(contents) => match fs::write(path, contents) {
            Ok(()) => debug!(path = %path.display(), "Saved cache file"),
            Err(err) => warn!(path = %path.display(), "Failed to write cache file: {err}"),
        },
        Err(err) => warn!("Failed to serialize cache entry: {err}"),
    }
}
