//! Frame source backed by recorded detector/tracker output.
//!
//! The input is JSON lines. An optional first line carries the frame size:
//!
//! ```text
//! {"width": 1280, "height": 720}
//! {"detections": [{"id": 1, "class": "car", "bbox": [600, 280, 680, 320], "score": 0.9}]}
//! {"detections": [], "image": "frames/000002.png"}
//! ```
//!
//! `id` and `score` are optional. Relative `image` paths are resolved against
//! the directory holding the replay file.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::counter::BoundingBox;
use crate::error::{Error, Result};
use crate::integration::{Frame, FrameImage, FrameSource, TrackedDetection};

#[derive(Debug, Deserialize)]
struct Header {
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct DetectionRecord {
    #[serde(default)]
    id: Option<i64>,
    class: String,
    bbox: BoundingBox,
    #[serde(default = "default_score")]
    score: f32,
}

fn default_score() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    detections: Vec<DetectionRecord>,
    #[serde(default)]
    image: Option<PathBuf>,
}

/// Reads frames from a JSON-lines recording, acting as the detector stage.
pub struct ReplaySource<R = BufReader<File>> {
    lines: Lines<R>,
    line_no: usize,
    pending: Option<String>,
    size: Option<(u32, u32)>,
    base_dir: PathBuf,
    conf_threshold: f32,
}

impl ReplaySource {
    /// Open a replay file. Failure here is a setup error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::SourceOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::from_reader(BufReader::new(file), base_dir))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn from_reader(reader: R, base_dir: impl Into<PathBuf>) -> Self {
        let mut source = Self {
            lines: reader.lines(),
            line_no: 0,
            pending: None,
            size: None,
            base_dir: base_dir.into(),
            conf_threshold: 0.0,
        };
        source.read_header();
        source
    }

    /// Drop detections scoring below `threshold`.
    pub fn with_conf_threshold(mut self, threshold: f32) -> Self {
        self.conf_threshold = threshold;
        self
    }

    fn read_header(&mut self) {
        let Some(first) = self.next_line() else {
            return;
        };
        match serde_json::from_str::<Header>(&first) {
            Ok(header) => {
                debug!(width = header.width, height = header.height, "replay header");
                self.size = Some((header.width, header.height));
            }
            Err(_) => self.pending = Some(first),
        }
    }

    /// Next non-blank line. A read error ends the stream.
    fn next_line(&mut self) -> Option<String> {
        loop {
            match self.lines.next()? {
                Ok(line) => {
                    self.line_no += 1;
                    if !line.trim().is_empty() {
                        return Some(line);
                    }
                }
                Err(e) => {
                    warn!(error = %e, line = self.line_no + 1, "replay read failed, ending stream");
                    return None;
                }
            }
        }
    }

    fn to_frame(&self, record: FrameRecord) -> Frame {
        let detections = record
            .detections
            .into_iter()
            .filter(|d| d.score >= self.conf_threshold)
            .map(|d| TrackedDetection {
                track_id: d.id.and_then(|id| u64::try_from(id).ok()),
                class_name: d.class,
                bbox: d.bbox,
                score: d.score,
            })
            .collect();

        Frame {
            detections,
            image: record
                .image
                .map(|p| FrameImage::File(self.base_dir.join(p))),
        }
    }
}

impl<R: BufRead> FrameSource for ReplaySource<R> {
    type Error = Error;

    fn frame_size(&self) -> Option<(u32, u32)> {
        self.size
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(line) = self.pending.take().or_else(|| self.next_line()) else {
            return Ok(None);
        };
        let record: FrameRecord = serde_json::from_str(&line).map_err(|source| {
            Error::MalformedFrame {
                line: self.line_no,
                source,
            }
        })?;
        Ok(Some(self.to_frame(record)))
    }
}
