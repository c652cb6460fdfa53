mod aggregator;
mod crossing;
mod geometry;
mod rect;
mod track_state;
mod vehicle_class;

pub use aggregator::{CountAggregator, RunSummary};
pub use crossing::{CrossingDetector, CrossingEvent};
pub use geometry::{Line, Side, side_value};
pub use rect::{BoundingBox, iou_batch};
pub use track_state::{TrackState, TrackStateStore};
pub use vehicle_class::{ClassCounts, VehicleClass};
