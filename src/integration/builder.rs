//! Builder for creating TrackedDetection objects from various box formats.

use crate::counter::BoundingBox;
use crate::integration::TrackedDetection;

/// Builder for creating `TrackedDetection` objects from various input formats.
#[derive(Debug, Clone)]
pub struct TrackedDetectionBuilder {
    bbox: BoundingBox,
    track_id: Option<u64>,
    class_name: String,
    score: f32,
}

impl Default for TrackedDetectionBuilder {
    fn default() -> Self {
        Self {
            bbox: BoundingBox::default(),
            track_id: None,
            class_name: String::new(),
            score: 1.0,
        }
    }
}

impl TrackedDetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = BoundingBox::new(x1, y1, x2, y2);
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = BoundingBox::from_xywh(cx, cy, w, h);
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, l: f32, t: f32, w: f32, h: f32) -> Self {
        self.bbox = BoundingBox::new(l, t, l + w, t + h);
        self
    }

    pub fn track_id(mut self, id: u64) -> Self {
        self.track_id = Some(id);
        self
    }

    pub fn class(mut self, name: impl Into<String>) -> Self {
        self.class_name = name.into();
        self
    }

    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    pub fn build(self) -> TrackedDetection {
        TrackedDetection {
            track_id: self.track_id,
            class_name: self.class_name,
            bbox: self.bbox,
            score: self.score,
        }
    }
}
