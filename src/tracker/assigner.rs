//! Identity assignment for detections that arrive without a track id.

use tracing::debug;

use crate::counter::BoundingBox;
use crate::integration::TrackedDetection;
use crate::tracker::matching::{self, AssignmentResult, FORBIDDEN_COST};

/// Configuration for the [`IdentityAssigner`].
#[derive(Debug, Clone)]
pub struct AssignerConfig {
    /// Minimum IoU for a detection to continue an existing track.
    pub match_iou: f32,
    /// Frames a track may go unmatched before it is dropped.
    pub max_age: u64,
}

impl Default for AssignerConfig {
    fn default() -> Self {
        Self {
            match_iou: 0.3,
            max_age: 30,
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveTrack {
    id: u64,
    class_name: String,
    bbox: BoundingBox,
    last_seen: u64,
}

/// Frame-to-frame IoU tracker that fills in missing `track_id`s.
///
/// Association is class-consistent and optimal per frame. Ids are handed out
/// in increasing order and stay above any id the upstream tracker supplied so
/// far. They are not reused until the counter saturates at `u64::MAX`.
///
/// Only upstream ids already seen are skipped. An upstream id that first
/// shows up later may equal one this assigner handed out earlier, and the
/// two objects then share crossing state. Feed either fully tracked or fully
/// untracked detections to avoid that.
#[derive(Debug, Clone)]
pub struct IdentityAssigner {
    config: AssignerConfig,
    tracks: Vec<ActiveTrack>,
    next_id: u64,
    frame_id: u64,
}

impl IdentityAssigner {
    /// Create an assigner with no active tracks.
    pub fn new(config: AssignerConfig) -> Self {
        Self {
            config,
            tracks: Vec::new(),
            next_id: 1,
            frame_id: 0,
        }
    }

    /// Number of tracks currently kept alive.
    pub fn active_tracks(&self) -> usize {
        self.tracks.len()
    }

    /// Assign ids to every detection of one frame whose `track_id` is `None`.
    pub fn assign(&mut self, detections: &mut [TrackedDetection]) {
        self.frame_id += 1;
        let max_age = self.config.max_age;
        let frame_id = self.frame_id;
        self.tracks.retain(|t| frame_id - t.last_seen <= max_age);

        for det in detections.iter() {
            if let Some(id) = det.track_id {
                self.next_id = self.next_id.max(id.saturating_add(1));
            }
        }

        let pending: Vec<usize> = detections
            .iter()
            .enumerate()
            .filter(|(_, d)| d.track_id.is_none() && d.bbox.is_finite())
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            return;
        }

        let track_boxes: Vec<BoundingBox> = self.tracks.iter().map(|t| t.bbox).collect();
        let det_boxes: Vec<BoundingBox> = pending.iter().map(|&i| detections[i].bbox).collect();
        let mut dists = matching::iou_distance(&track_boxes, &det_boxes);
        for (i, track) in self.tracks.iter().enumerate() {
            for (j, &det_idx) in pending.iter().enumerate() {
                if track.class_name != detections[det_idx].class_name {
                    dists[[i, j]] = FORBIDDEN_COST;
                }
            }
        }

        let AssignmentResult {
            matches,
            unmatched_detections,
            ..
        } = matching::linear_assignment(&dists, 1.0 - self.config.match_iou);

        for (itrack, j) in matches {
            let det = &mut detections[pending[j]];
            let track = &mut self.tracks[itrack];
            track.bbox = det.bbox;
            track.last_seen = frame_id;
            det.track_id = Some(track.id);
        }

        for j in unmatched_detections {
            let det = &mut detections[pending[j]];
            let id = self.next_id;
            self.next_id = self.next_id.saturating_add(1);
            debug!(track_id = id, class = %det.class_name, frame_id, "new identity");
            det.track_id = Some(id);
            self.tracks.push(ActiveTrack {
                id,
                class_name: det.class_name.clone(),
                bbox: det.bbox,
                last_seen: frame_id,
            });
        }
    }
}

impl Default for IdentityAssigner {
    fn default() -> Self {
        Self::new(AssignerConfig::default())
    }
}
