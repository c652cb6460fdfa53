//! CountingPipeline: drives frames through tracking, crossing detection and
//! aggregation.

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::counter::{CountAggregator, CrossingDetector, CrossingEvent, Line, RunSummary};
use crate::tracker::{AssignerConfig, IdentityAssigner};

use super::{Frame, FrameSource, SnapshotSink};

/// Frame size assumed when neither the line nor the source size is known.
pub const FALLBACK_FRAME_SIZE: (u32, u32) = (1280, 720);

/// Configuration for a counting run.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Counting line; defaults to the horizontal mid-line of the frame.
    pub line: Option<Line>,
    /// Assign identities to detections that come without one.
    pub assign_ids: Option<AssignerConfig>,
    /// Input reference reported back in the summary.
    pub source_label: Option<String>,
}

/// Frame loop driver combining a `FrameSource` with the counting core.
pub struct CountingPipeline<S: FrameSource> {
    source: S,
    detector: CrossingDetector,
    aggregator: CountAggregator,
    assigner: Option<IdentityAssigner>,
    snapshots: Option<Box<dyn SnapshotSink>>,
    frame_index: u64,
    source_label: Option<String>,
}

impl<S: FrameSource> CountingPipeline<S> {
    /// Create a pipeline, falling back to the frame's mid-line when no line is set.
    pub fn new(source: S, config: PipelineConfig) -> Self {
        let line = config.line.unwrap_or_else(|| {
            let (w, h) = source.frame_size().unwrap_or(FALLBACK_FRAME_SIZE);
            Line::horizontal_midline(w, h)
        });
        info!(line = ?line.to_xyxy(), "counting line");

        Self {
            source,
            detector: CrossingDetector::new(line),
            aggregator: CountAggregator::new(),
            assigner: config.assign_ids.map(IdentityAssigner::new),
            snapshots: None,
            frame_index: 0,
            source_label: config.source_label,
        }
    }

    /// Save an annotated frame for every counted vehicle.
    pub fn with_snapshots(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.snapshots = Some(Box::new(sink));
        self
    }

    /// Get the counting line in use.
    pub fn line(&self) -> &Line {
        self.detector.line()
    }

    /// Get a reference to the crossing detector.
    pub fn detector(&self) -> &CrossingDetector {
        &self.detector
    }

    /// Get a reference to the count aggregator.
    pub fn aggregator(&self) -> &CountAggregator {
        &self.aggregator
    }

    /// Frames seen so far, including unreadable ones.
    pub fn frames_processed(&self) -> u64 {
        self.frame_index
    }

    /// Process one frame and return the crossings it produced.
    pub fn process_frame(&mut self, mut frame: Frame) -> Vec<CrossingEvent> {
        self.frame_index += 1;
        let frame_index = self.frame_index;

        if let Some(assigner) = self.assigner.as_mut() {
            assigner.assign(&mut frame.detections);
        }

        let mut events = Vec::new();
        for det in &frame.detections {
            let Some(track_id) = det.track_id else {
                continue;
            };
            if let Some(event) = self.detector.observe(
                track_id,
                &det.class_name,
                det.bbox.center(),
                det.bbox,
                frame_index,
            ) {
                events.push(event);
            }
        }

        let mut pixels: Option<RgbImage> = None;
        for event in &events {
            self.aggregator.accept(event.clone());
            self.capture(&frame, &mut pixels, event);
        }
        events
    }

    fn capture(&mut self, frame: &Frame, pixels: &mut Option<RgbImage>, event: &CrossingEvent) {
        let Some(sink) = self.snapshots.as_mut() else {
            return;
        };
        let Some(image) = frame.image.as_ref() else {
            debug!(frame_index = event.frame_index, "no frame image, snapshot skipped");
            return;
        };

        if pixels.is_none() {
            match image.load() {
                Ok(img) => *pixels = Some(img),
                Err(e) => {
                    warn!(
                        error = %e,
                        frame_index = event.frame_index,
                        "could not load frame image"
                    );
                    return;
                }
            }
        }
        let Some(img) = pixels.as_ref() else {
            return;
        };

        match sink.save(event.frame_index, img, &event.bbox) {
            Ok(path) => self.aggregator.record_snapshot(path.display().to_string()),
            Err(e) => warn!(error = %e, frame_index = event.frame_index, "snapshot write failed"),
        }
    }

    /// Run until the source is exhausted and return the summary.
    ///
    /// Unreadable frames are logged and skipped; they still advance the frame
    /// index.
    pub fn run(mut self) -> RunSummary {
        loop {
            match self.source.next_frame() {
                Ok(Some(frame)) => {
                    self.process_frame(frame);
                }
                Ok(None) => break,
                Err(e) => {
                    self.frame_index += 1;
                    warn!(error = %e, frame_index = self.frame_index, "frame skipped");
                }
            }
        }
        self.finish()
    }

    /// Finalize without reading further frames.
    pub fn finish(self) -> RunSummary {
        let mut summary = self.aggregator.finalize();
        summary.output_video = self.source_label;
        info!(
            count = summary.count,
            frames = self.frame_index,
            tracks = self.detector.store().len(),
            "counting finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::BoundingBox;
    use crate::error::Result;
    use crate::integration::{FrameImage, FrameIter, TrackedDetection};
    use std::path::PathBuf;

    fn car(id: Option<u64>, cy: f32) -> TrackedDetection {
        TrackedDetection::new(id, "car", BoundingBox::from_xywh(640.0, cy, 80.0, 40.0))
    }

    fn frames(dets: Vec<Vec<TrackedDetection>>) -> FrameIter<std::vec::IntoIter<Frame>> {
        FrameIter::new(dets.into_iter().map(Frame::new).collect::<Vec<_>>())
    }

    #[derive(Default)]
    struct RecordingSink {
        saved: std::rc::Rc<std::cell::RefCell<Vec<u64>>>,
        fail: bool,
    }

    impl SnapshotSink for RecordingSink {
        fn save(
            &mut self,
            frame_index: u64,
            _frame: &RgbImage,
            _bbox: &BoundingBox,
        ) -> Result<PathBuf> {
            if self.fail {
                return Err(std::io::Error::other("disk full").into());
            }
            self.saved.borrow_mut().push(frame_index);
            Ok(PathBuf::from(format!("snap_{frame_index}.jpg")))
        }
    }

    #[test]
    fn test_default_line_from_frame_size() {
        let pipeline = CountingPipeline::new(
            frames(vec![]).with_frame_size(640, 480),
            PipelineConfig::default(),
        );
        assert_eq!(pipeline.line().to_xyxy(), [0.0, 240.0, 639.0, 240.0]);

        let pipeline = CountingPipeline::new(frames(vec![]), PipelineConfig::default());
        assert_eq!(pipeline.line().to_xyxy(), [0.0, 360.0, 1279.0, 360.0]);
    }

    #[test]
    fn test_detections_without_id_are_skipped() {
        let source = frames(vec![vec![car(None, 300.0)], vec![car(None, 420.0)]]);
        let summary = CountingPipeline::new(source, PipelineConfig::default()).run();
        assert_eq!(summary.count, 0);
    }

    #[test]
    fn test_assigner_fills_missing_ids() {
        // Boxes overlap enough between frames to keep one identity.
        let source = frames(vec![
            vec![car(None, 340.0)],
            vec![car(None, 350.0)],
            vec![car(None, 370.0)],
        ]);
        let config = PipelineConfig {
            assign_ids: Some(AssignerConfig::default()),
            ..Default::default()
        };
        let summary = CountingPipeline::new(source, config).run();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.by_class.car, 1);
    }

    #[test]
    fn test_snapshots_recorded_in_order() {
        let img = FrameImage::Pixels(RgbImage::new(32, 32));
        let source = FrameIter::new(vec![
            Frame::new(vec![car(Some(1), 300.0), car(Some(2), 420.0)]).with_image(img.clone()),
            Frame::new(vec![car(Some(1), 420.0)]).with_image(img.clone()),
            Frame::new(vec![car(Some(2), 300.0)]),
        ]);
        let sink = RecordingSink::default();
        let saved = sink.saved.clone();

        let summary = CountingPipeline::new(source, PipelineConfig::default())
            .with_snapshots(sink)
            .run();

        // Frame 3 has no image, so only one snapshot exists for two counts.
        assert_eq!(summary.count, 2);
        assert_eq!(summary.images, vec!["snap_2.jpg"]);
        assert_eq!(*saved.borrow(), vec![2]);
    }

    #[test]
    fn test_snapshot_failure_keeps_count() {
        let img = FrameImage::Pixels(RgbImage::new(8, 8));
        let source = FrameIter::new(vec![
            Frame::new(vec![car(Some(1), 300.0)]),
            Frame::new(vec![car(Some(1), 420.0)]).with_image(img),
        ]);
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let summary = CountingPipeline::new(source, PipelineConfig::default())
            .with_snapshots(sink)
            .run();
        assert_eq!(summary.count, 1);
        assert!(summary.images.is_empty());
    }

    #[test]
    fn test_source_label_reported() {
        let config = PipelineConfig {
            source_label: Some("input.mp4".into()),
            ..Default::default()
        };
        let summary = CountingPipeline::new(frames(vec![]), config).run();
        assert_eq!(summary.output_video.as_deref(), Some("input.mp4"));
    }
}
