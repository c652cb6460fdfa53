//! Integration module for connecting detector/tracker output with the
//! counting core.
//!
//! This module provides the frame-source boundary, a replay source for
//! recorded tracker output, snapshot capture and the frame loop driver.

mod builder;
mod detector;
mod pipeline;
mod replay;
mod snapshot;

pub use builder::TrackedDetectionBuilder;
pub use detector::{Frame, FrameImage, FrameIter, FrameSource, TrackedDetection};
pub use pipeline::{CountingPipeline, FALLBACK_FRAME_SIZE, PipelineConfig};
pub use replay::ReplaySource;
pub use snapshot::{BOX_COLOR, BOX_THICKNESS, DirectorySnapshotSink, SnapshotSink, draw_box};
