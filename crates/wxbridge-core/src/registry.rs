//! Process-wide registry of per-field delta trackers.
//!
//! The registry is owned by the run loop: restored from disk at startup,
//! mutated as readings arrive, and saved back on shutdown. Load is
//! fail-open — a missing or corrupt state file yields an empty registry and
//! a log line, never a startup failure.
//!
//! # Storage Format
//!
//! A single pretty-printed JSON document mapping field name to tracker,
//! including each tracker's full observation history and window.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::tracker::DeltaTracker;

/// Mapping from field name to [`DeltaTracker`], one tracker per field.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackerRegistry {
    trackers: HashMap<String, DeltaTracker>,
}

impl TrackerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered trackers.
    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    /// Whether the registry holds no trackers.
    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Return the tracker for `field`, creating one with `window_minutes`
    /// on first use.
    ///
    /// The window is fixed when the tracker is first created; a later call
    /// with a different window returns the existing tracker unchanged.
    pub fn get_or_create(&mut self, field: &str, window_minutes: u64) -> &mut DeltaTracker {
        self.trackers
            .entry(field.to_string())
            .or_insert_with(|| DeltaTracker::new(field, window_minutes))
    }

    /// Look up the tracker for `field`, if one exists.
    pub fn get(&self, field: &str) -> Option<&DeltaTracker> {
        self.trackers.get(field)
    }

    /// Restore a registry from `path`.
    ///
    /// An absent file yields an empty registry. An unreadable or corrupt
    /// file logs a warning and also yields an empty registry — tracker
    /// state is an optimization, not a requirement, and must never stop
    /// startup.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no tracker state at {}, starting empty", path.display());
            return Self::new();
        }
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Self>(&json) {
                Ok(registry) => {
                    log::info!(
                        "restored {} tracker(s) from {}",
                        registry.len(),
                        path.display()
                    );
                    registry
                }
                Err(e) => {
                    log::warn!(
                        "tracker state at {} is corrupt ({e}), starting empty",
                        path.display()
                    );
                    Self::new()
                }
            },
            Err(e) => {
                log::warn!(
                    "could not read tracker state at {} ({e}), starting empty",
                    path.display()
                );
                Self::new()
            }
        }
    }

    /// Serialize the registry (full histories and windows) to `path`.
    ///
    /// Writes a sibling temp file first and renames it into place, so a
    /// crash mid-write cannot leave a truncated file that later parses as
    /// the registry. The caller decides how loudly to report failure; a
    /// failed save leaves the in-memory state as the only copy.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
