//! Boundary types for the upstream detector/tracker and frame reader.

use std::convert::Infallible;
use std::path::PathBuf;

use image::RgbImage;

use crate::counter::BoundingBox;
use crate::error::Result;

/// One object reported by the detector/tracker for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedDetection {
    /// Tracker identity; `None` when the tracker lost or never resolved it.
    pub track_id: Option<u64>,
    /// Detector class label, e.g. `"car"`.
    pub class_name: String,
    /// Box in frame pixel coordinates.
    pub bbox: BoundingBox,
    /// Detection confidence score
    pub score: f32,
}

impl TrackedDetection {
    pub fn new(track_id: Option<u64>, class_name: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            track_id,
            class_name: class_name.into(),
            bbox,
            score: 1.0,
        }
    }
}

/// Pixels of a frame, either decoded already or stored on disk.
///
/// File-backed images are only decoded when a snapshot is actually taken.
#[derive(Debug, Clone)]
pub enum FrameImage {
    Pixels(RgbImage),
    File(PathBuf),
}

impl FrameImage {
    pub fn load(&self) -> Result<RgbImage> {
        match self {
            FrameImage::Pixels(img) => Ok(img.clone()),
            FrameImage::File(path) => Ok(image::open(path)?.to_rgb8()),
        }
    }
}

/// Everything the counter gets for one frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub detections: Vec<TrackedDetection>,
    pub image: Option<FrameImage>,
}

impl Frame {
    pub fn new(detections: Vec<TrackedDetection>) -> Self {
        Self {
            detections,
            image: None,
        }
    }

    pub fn with_image(mut self, image: FrameImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// Ordered source of frames with their tracked detections.
///
/// Implement this to connect a video reader plus detector/tracker to the
/// counting pipeline.
///
/// # Example
///
/// ```ignore
/// use linecount_rs::{Frame, FrameSource};
///
/// struct MyCamera { /* decoder + model */ }
///
/// impl FrameSource for MyCamera {
///     type Error = std::io::Error;
///
///     fn frame_size(&self) -> Option<(u32, u32)> {
///         Some((1280, 720))
///     }
///
///     fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
///         // Decode, detect, track
///         Ok(None)
///     }
/// }
/// ```
pub trait FrameSource {
    /// Error for a single unreadable frame.
    type Error: std::fmt::Display;

    /// Frame width and height in pixels, if known.
    fn frame_size(&self) -> Option<(u32, u32)>;

    /// Produce the next frame, or `Ok(None)` once the stream is exhausted.
    ///
    /// An `Err` stands for one lost frame; the caller keeps reading.
    fn next_frame(&mut self) -> std::result::Result<Option<Frame>, Self::Error>;
}

/// Adapts any iterator of frames into a [`FrameSource`].
#[derive(Debug, Clone)]
pub struct FrameIter<I> {
    frames: I,
    size: Option<(u32, u32)>,
}

impl<I: Iterator<Item = Frame>> FrameIter<I> {
    pub fn new(frames: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            frames: frames.into_iter(),
            size: None,
        }
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }
}

impl<I: Iterator<Item = Frame>> FrameSource for FrameIter<I> {
    type Error = Infallible;

    fn frame_size(&self) -> Option<(u32, u32)> {
        self.size
    }

    fn next_frame(&mut self) -> std::result::Result<Option<Frame>, Self::Error> {
        Ok(self.frames.next())
    }
}
