//! Watermark persistence: load with corruption recovery, atomic save.
//!
//! The file is a JSON object with exactly the category-universe keys, each
//! mapped to a string cursor. `save` writes `<path>.tmp` and renames it over
//! `<path>`, so readers never observe a torn file and a crash between the
//! two steps leaves the previous file intact. The temporary file and the
//! directory entry are synced to disk around the rename. On a parse failure the
//! original bytes are preserved verbatim in `<path>.bak`.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::watermark::{Cursor, WatermarkSet};
use crate::error::StoreError;
use crate::types::category::EventCategory;

/// What `load` found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
    /// No file existed; defaults were written.
    Created,
    /// The file parsed; absent keys (if any) were filled with the default.
    Existing { filled: usize },
    /// The file did not parse; it was backed up and defaults were written.
    Recovered { backup: PathBuf },
}

/// Result of `WatermarkStore::load`.
#[derive(Debug, Clone)]
pub struct LoadedWatermarks {
    pub watermarks: WatermarkSet,
    pub origin: LoadOrigin,
}

impl LoadedWatermarks {
    /// Whether the orchestrator should run catch-up. True both for a missing
    /// file and for a recovered corrupt one.
    pub fn is_first_run(&self) -> bool {
        !matches!(self.origin, LoadOrigin::Existing { .. })
    }
}

/// File-backed watermark store.
#[derive(Debug, Clone)]
pub struct WatermarkStore {
    path: PathBuf,
}

impl WatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        WatermarkStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tmp_path(&self) -> PathBuf {
        sibling(&self.path, ".tmp")
    }

    pub fn backup_path(&self) -> PathBuf {
        sibling(&self.path, ".bak")
    }

    /// Load the watermark set, initializing every category to `default` when
    /// the file is missing or corrupt.
    pub fn load(&self, default: &Cursor) -> Result<LoadedWatermarks, StoreError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    path = %self.path.display(),
                    cursor = %default,
                    "no watermark file found, initializing"
                );
                let watermarks = WatermarkSet::uniform(default.clone());
                self.save(&watermarks)?;
                return Ok(LoadedWatermarks {
                    watermarks,
                    origin: LoadOrigin::Created,
                });
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        match serde_json::from_slice::<BTreeMap<EventCategory, Cursor>>(&raw) {
            Ok(partial) => {
                let filled = EventCategory::COUNT - partial.len();
                if filled > 0 {
                    info!(filled, cursor = %default, "filled missing watermark categories");
                }
                Ok(LoadedWatermarks {
                    watermarks: WatermarkSet::from_partial(partial, default),
                    origin: LoadOrigin::Existing { filled },
                })
            }
            Err(parse_error) => {
                let backup = self.backup_path();
                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    error = %parse_error,
                    "corrupted watermark file, backing up and reinitializing"
                );
                self.retire_backup()?;
                write_synced(&backup, &raw)?;
                let watermarks = WatermarkSet::uniform(default.clone());
                self.save(&watermarks)?;
                Ok(LoadedWatermarks {
                    watermarks,
                    origin: LoadOrigin::Recovered { backup },
                })
            }
        }
    }

    /// Atomically replace the file with `watermarks`.
    pub fn save(&self, watermarks: &WatermarkSet) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(watermarks)?;
        let tmp = self.tmp_path();
        write_synced(&tmp, json.as_bytes())?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        sync_parent(&self.path)
    }

    /// Move an existing `<path>.bak` aside to `<path>.bak.<unix secs>` so a
    /// second corruption does not destroy the first one's bytes.
    fn retire_backup(&self) -> Result<(), StoreError> {
        let backup = self.backup_path();
        if !backup.exists() {
            return Ok(());
        }
        let retired = sibling(&backup, &format!(".{}", chrono::Utc::now().timestamp()));
        warn!(
            previous = %backup.display(),
            moved_to = %retired.display(),
            "an older watermark backup exists, keeping it aside"
        );
        std::fs::rename(&backup, &retired).map_err(|e| StoreError::io(&retired, e))
    }
}

/// Write `bytes` to `path` and flush them to disk before returning.
fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    file.write_all(bytes).map_err(|e| StoreError::io(path, e))?;
    file.sync_all().map_err(|e| StoreError::io(path, e))
}

/// Flush the directory entry so a completed rename survives power loss.
#[cfg(unix)]
fn sync_parent(path: &Path) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| StoreError::io(dir, e))
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
