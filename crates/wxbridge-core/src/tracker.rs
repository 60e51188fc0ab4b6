//! Sliding-window delta tracking for cumulative sensor counters.
//!
//! Weather sensors report rain as a lifetime tip count, not a rate. A
//! [`DeltaTracker`] turns that cumulative counter into "how much since the
//! start of the window" by keeping the raw observations seen inside a
//! configurable time window and reporting the change between the oldest and
//! newest retained value.

use std::collections::VecDeque;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Stateful tracker that reports the delta from the first to the last
/// observation inside its time window.
///
/// One tracker owns exactly one field. The observation sequence is ordered
/// by timestamp and serialized in full, so a restored tracker resumes with
/// its window intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeltaTracker {
    field: String,
    window_minutes: u64,
    samples: VecDeque<(i64, f64)>,
}

impl DeltaTracker {
    /// Create an empty tracker for `field` with the given window.
    pub fn new(field: &str, window_minutes: u64) -> Self {
        Self {
            field: field.to_string(),
            window_minutes,
            samples: VecDeque::new(),
        }
    }

    /// Field this tracker observes.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Window length in minutes, fixed at creation.
    pub fn window_minutes(&self) -> u64 {
        self.window_minutes
    }

    /// Number of retained observations.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the tracker has no retained observations.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Record `value` at the current time and return the window delta.
    pub fn observe(&mut self, value: f64) -> f64 {
        self.observe_at(value, Utc::now().timestamp())
    }

    /// Record `value` at `timestamp` (epoch seconds) and return the window
    /// delta.
    ///
    /// Entries older than `timestamp - window` are evicted from the head of
    /// the sequence. Eviction uses a strict comparison and never touches the
    /// entry just inserted, so the sequence can shrink to one entry but not
    /// to zero. With fewer than two retained entries the delta is 0 (cold
    /// start, or the instant the window first rolls over). Otherwise the
    /// result is `max(0, newest - oldest)`; a negative boundary delta means
    /// the counter reset and is clamped to 0.
    pub fn observe_at(&mut self, value: f64, timestamp: i64) -> f64 {
        self.samples.push_back((timestamp, value));

        let cutoff = timestamp - self.window_minutes as i64 * 60;
        while let Some(&(ts, _)) = self.samples.front() {
            if ts < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }

        if self.samples.len() < 2 {
            return 0.0;
        }
        match (self.samples.front(), self.samples.back()) {
            (Some(&(_, first)), Some(&(_, last))) => (last - first).max(0.0),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_observation_returns_zero() {
        let mut t = DeltaTracker::new("rain_mm", 60);
        assert_eq!(t.observe_at(10.0, 1000), 0.0);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_delta_is_last_minus_first_within_window() {
        let mut t = DeltaTracker::new("rain_mm", 60);
        t.observe_at(10.0, 1000);
        t.observe_at(12.0, 1060);
        let delta = t.observe_at(15.5, 1120);
        assert_eq!(delta, 5.5);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_counter_reset_clamps_to_zero() {
        let mut t = DeltaTracker::new("rain_mm", 60);
        t.observe_at(100.0, 1000);
        let delta = t.observe_at(3.0, 1060);
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn test_old_entries_are_evicted() {
        let mut t = DeltaTracker::new("rain_mm", 60);
        t.observe_at(10.0, 0);
        t.observe_at(20.0, 1800);
        // 3601 puts the first entry strictly before the cutoff of 1.
        let delta = t.observe_at(25.0, 3601);
        assert_eq!(delta, 5.0);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_eviction_can_leave_single_entry() {
        let mut t = DeltaTracker::new("rain_mm", 60);
        t.observe_at(10.0, 0);
        // Far outside the window: only the new entry survives.
        let delta = t.observe_at(50.0, 100_000);
        assert_eq!(delta, 0.0);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_fresh_entry_never_expires_relative_to_itself() {
        let mut t = DeltaTracker::new("rain_mm", 0);
        // Zero-minute window: cutoff equals the new timestamp, strict
        // comparison keeps the inserted entry.
        assert_eq!(t.observe_at(5.0, 1000), 0.0);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_entry_exactly_at_cutoff_is_retained() {
        let mut t = DeltaTracker::new("rain_mm", 60);
        t.observe_at(10.0, 0);
        // Cutoff is exactly 0; strict less-than keeps the first entry.
        let delta = t.observe_at(14.0, 3600);
        assert_eq!(delta, 4.0);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_observe_defaults_to_now() {
        let mut t = DeltaTracker::new("rain_mm", 60);
        t.observe(10.0);
        let delta = t.observe(16.0);
        assert_eq!(delta, 6.0);
    }

    #[test]
    fn test_serde_roundtrip_preserves_window_state() {
        let mut t = DeltaTracker::new("rain_mm", 1440);
        t.observe_at(1.0, 100);
        t.observe_at(2.5, 200);

        let json = serde_json::to_string(&t).unwrap();
        let mut restored: DeltaTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.field(), "rain_mm");
        assert_eq!(restored.window_minutes(), 1440);
        assert_eq!(restored.len(), 2);

        // Restored history participates in the next delta.
        let delta = restored.observe_at(4.0, 300);
        assert_eq!(delta, 3.0);
    }
}
