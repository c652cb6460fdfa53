use std::collections::HashMap;

use super::geometry::Side;

/// Per-identity crossing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackState {
    /// Side recorded at the most recent observation, `None` before the first.
    pub last_side: Option<Side>,
    /// Set once a crossing has been counted; never cleared.
    pub counted: bool,
}

/// Crossing state for every identity seen during a run.
///
/// Entries are created on first observation and kept until the run ends.
#[derive(Debug, Clone, Default)]
pub struct TrackStateStore {
    states: HashMap<u64, TrackState>,
}

impl TrackStateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the side recorded at the last observation, if any.
    pub fn get_last_side(&self, track_id: u64) -> Option<Side> {
        self.states.get(&track_id).and_then(|s| s.last_side)
    }

    /// Overwrite the recorded side.
    pub fn set_last_side(&mut self, track_id: u64, side: Side) {
        self.states.entry(track_id).or_default().last_side = Some(side);
    }

    /// Whether a crossing was already counted for this identity.
    pub fn is_counted(&self, track_id: u64) -> bool {
        self.states.get(&track_id).is_some_and(|s| s.counted)
    }

    /// Mark the identity as counted. Calling it again is a no-op.
    pub fn mark_counted(&mut self, track_id: u64) {
        self.states.entry(track_id).or_default().counted = true;
    }

    /// Get the full state of one identity.
    pub fn get(&self, track_id: u64) -> Option<&TrackState> {
        self.states.get(&track_id)
    }

    /// Number of distinct identities observed.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no identity has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
