//! Per-track line-crossing decision.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::geometry::{Line, Side};
use super::rect::BoundingBox;
use super::track_state::TrackStateStore;
use super::vehicle_class::VehicleClass;

/// A counted crossing. At most one is produced per track identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossingEvent {
    pub track_id: u64,
    pub class: VehicleClass,
    pub frame_index: u64,
    pub center: [f32; 2],
    pub bbox: BoundingBox,
}

/// Decides, observation by observation, when a track first changes side.
///
/// Owns the counting line and the per-track state for one run.
#[derive(Debug, Clone)]
pub struct CrossingDetector {
    line: Line,
    store: TrackStateStore,
}

impl CrossingDetector {
    /// Create a detector for `line` with no track state.
    pub fn new(line: Line) -> Self {
        Self {
            line,
            store: TrackStateStore::new(),
        }
    }

    /// Get the counting line.
    pub fn line(&self) -> &Line {
        &self.line
    }

    /// Get a reference to the per-track state.
    pub fn store(&self) -> &TrackStateStore {
        &self.store
    }

    /// Feed one observation of `track_id` and return an event if this
    /// observation is the track's first countable crossing.
    ///
    /// Unrecognized classes and non-finite centers are ignored without
    /// touching any state. The recorded side is updated on every other
    /// observation, including ones that land exactly on the line, so a
    /// sequence `+, 0, -` does not count: the `0` replaces the `+`.
    pub fn observe(
        &mut self,
        track_id: u64,
        class_name: &str,
        center: Point2<f32>,
        bbox: BoundingBox,
        frame_index: u64,
    ) -> Option<CrossingEvent> {
        let class = VehicleClass::from_label(class_name)?;
        if !center.x.is_finite() || !center.y.is_finite() {
            return None;
        }

        let side_now = Side::of(center, &self.line);
        let Some(side_prev) = self.store.get_last_side(track_id) else {
            self.store.set_last_side(track_id, side_now);
            return None;
        };

        let crossed = side_now.is_flip_from(side_prev);
        let event = if crossed && !self.store.is_counted(track_id) {
            self.store.mark_counted(track_id);
            info!(track_id, %class, frame_index, "vehicle crossed counting line");
            Some(CrossingEvent {
                track_id,
                class,
                frame_index,
                center: [center.x, center.y],
                bbox,
            })
        } else {
            if crossed {
                debug!(track_id, frame_index, "re-crossing ignored, already counted");
            }
            None
        };

        self.store.set_last_side(track_id, side_now);
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> CrossingDetector {
        CrossingDetector::new(Line::new(0.0, 360.0, 1279.0, 360.0).unwrap())
    }

    /// Feed a track through points with the given y values, one per frame.
    fn feed(det: &mut CrossingDetector, track_id: u64, class: &str, ys: &[f32]) -> usize {
        ys.iter()
            .enumerate()
            .filter_map(|(i, &y)| {
                let bbox = BoundingBox::from_xywh(640.0, y, 80.0, 40.0);
                det.observe(track_id, class, bbox.center(), bbox, i as u64 + 1)
            })
            .count()
    }

    #[test]
    fn test_first_observation_never_counts() {
        let mut det = detector();
        assert_eq!(feed(&mut det, 1, "car", &[300.0]), 0);
        assert_eq!(feed(&mut det, 2, "car", &[360.0]), 0);
        assert_eq!(det.store().get_last_side(1), Some(Side::Positive));
        assert_eq!(det.store().get_last_side(2), Some(Side::OnLine));
    }

    #[test]
    fn test_single_flip_counts_once() {
        let mut det = detector();
        assert_eq!(feed(&mut det, 1, "car", &[300.0, 420.0]), 1);
        assert!(det.store().is_counted(1));
    }

    #[test]
    fn test_back_and_forth_counts_once() {
        let mut det = detector();
        let ys = [300.0, 420.0, 300.0, 420.0, 300.0, 420.0];
        assert_eq!(feed(&mut det, 9, "truck", &ys), 1);
        // Recorded side follows the object, not the side at count time.
        assert_eq!(det.store().get_last_side(9), Some(Side::Negative));
    }

    #[test]
    fn test_on_line_dead_zone() {
        let mut det = detector();
        assert_eq!(feed(&mut det, 1, "car", &[300.0, 360.0, 360.0, 360.0]), 0);

        let mut det = detector();
        assert_eq!(feed(&mut det, 2, "car", &[300.0, 360.0, 420.0]), 0);

        // A real flip after the dead zone still counts.
        let mut det = detector();
        assert_eq!(feed(&mut det, 3, "car", &[300.0, 360.0, 420.0, 300.0]), 1);
    }

    #[test]
    fn test_unknown_class_leaves_no_state() {
        let mut det = detector();
        assert_eq!(feed(&mut det, 5, "person", &[300.0, 420.0, 300.0]), 0);
        assert!(det.store().is_empty());
    }

    #[test]
    fn test_unknown_class_leaves_known_track_untouched() {
        let mut det = detector();
        assert_eq!(feed(&mut det, 1, "car", &[300.0]), 0);
        let before = *det.store().get(1).unwrap();

        // Same id, other side of the line, but a class outside the set.
        let bbox = BoundingBox::from_xywh(640.0, 420.0, 80.0, 40.0);
        assert!(det.observe(1, "person", bbox.center(), bbox, 2).is_none());

        assert_eq!(*det.store().get(1).unwrap(), before);
        assert_eq!(det.store().get_last_side(1), Some(Side::Positive));
        assert!(!det.store().is_counted(1));
    }

    #[test]
    fn test_non_finite_center_ignored() {
        let mut det = detector();
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let event = det.observe(1, "car", Point2::new(f32::NAN, 300.0), bbox, 1);
        assert!(event.is_none());
        assert!(det.store().is_empty());
    }

    #[test]
    fn test_event_fields() {
        let mut det = detector();
        let a = BoundingBox::new(600.0, 280.0, 680.0, 320.0);
        let b = BoundingBox::new(600.0, 400.0, 680.0, 440.0);
        assert!(det.observe(42, "bus", a.center(), a, 10).is_none());
        let event = det.observe(42, "bus", b.center(), b, 11).unwrap();
        assert_eq!(event.track_id, 42);
        assert_eq!(event.class, VehicleClass::Bus);
        assert_eq!(event.frame_index, 11);
        assert_eq!(event.center, [640.0, 420.0]);
        assert_eq!(event.bbox, b);
    }

    #[test]
    fn test_tracks_are_independent() {
        let mut det = detector();
        assert_eq!(feed(&mut det, 1, "car", &[300.0, 420.0]), 1);
        assert_eq!(feed(&mut det, 2, "motorcycle", &[420.0, 300.0]), 1);
        assert_eq!(feed(&mut det, 3, "car", &[300.0, 310.0]), 0);
    }
}
