//! Line-crossing vehicle counting on top of multi-object tracker output.
//!
//! Each tracked vehicle is counted once, the first time its box center
//! changes side of a reference line. Counts are kept per vehicle class.

pub mod counter;
pub mod error;
pub mod integration;
pub mod tracker;

pub use counter::{
    BoundingBox, ClassCounts, CountAggregator, CrossingDetector, CrossingEvent, Line, RunSummary,
    Side, VehicleClass,
};
pub use error::{Error, Result};
pub use integration::{
    CountingPipeline, DirectorySnapshotSink, Frame, FrameImage, FrameIter, FrameSource,
    PipelineConfig, ReplaySource, SnapshotSink, TrackedDetection, TrackedDetectionBuilder,
};
pub use tracker::{AssignerConfig, IdentityAssigner};
