//! Annotated frame capture for counted vehicles.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use crate::counter::BoundingBox;
use crate::error::Result;

/// Box colour drawn on snapshots.
pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 50]);
/// Box stroke width in pixels.
pub const BOX_THICKNESS: u32 = 15;

/// Receives a frame each time a vehicle is counted.
pub trait SnapshotSink {
    /// Persist `frame` annotated with `bbox`, returning where it was written.
    fn save(&mut self, frame_index: u64, frame: &RgbImage, bbox: &BoundingBox) -> Result<PathBuf>;
}

/// Writes `frame_{index:06}.jpg` files into a directory.
///
/// Two events in the same frame write the same file name; the later one wins
/// on disk and both paths are reported.
#[derive(Debug, Clone)]
pub struct DirectorySnapshotSink {
    dir: PathBuf,
}

impl DirectorySnapshotSink {
    /// Use `dir` for snapshots, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(frame_index: u64) -> String {
        format!("frame_{:06}.jpg", frame_index)
    }
}

impl SnapshotSink for DirectorySnapshotSink {
    fn save(&mut self, frame_index: u64, frame: &RgbImage, bbox: &BoundingBox) -> Result<PathBuf> {
        let mut snap = frame.clone();
        draw_box(&mut snap, bbox, BOX_COLOR, BOX_THICKNESS);
        let path = self.dir.join(Self::file_name(frame_index));
        snap.save(&path)?;
        Ok(path)
    }
}

/// Draw a hollow rectangle whose stroke is centred on the box edges.
pub fn draw_box(img: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    if !bbox.is_finite() || img.width() == 0 || img.height() == 0 {
        return;
    }
    let half = (thickness / 2) as i64;
    let (x1, y1) = (bbox.x1 as i64, bbox.y1 as i64);
    let (x2, y2) = (bbox.x2 as i64, bbox.y2 as i64);

    let max_x = img.width() as i64 - 1;
    let max_y = img.height() as i64 - 1;
    let (ox1, oy1) = ((x1 - half).max(0), (y1 - half).max(0));
    let (ox2, oy2) = ((x2 + half).min(max_x), (y2 + half).min(max_y));

    for y in oy1..=oy2 {
        for x in ox1..=ox2 {
            let inside = x > x1 + half && x < x2 - half && y > y1 + half && y < y2 - half;
            if !inside {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(DirectorySnapshotSink::file_name(42), "frame_000042.jpg");
    }

    #[test]
    fn test_draw_box_leaves_interior() {
        let mut img = RgbImage::new(100, 100);
        draw_box(&mut img, &BoundingBox::new(20.0, 20.0, 80.0, 80.0), BOX_COLOR, 3);

        assert_eq!(*img.get_pixel(20, 50), BOX_COLOR);
        assert_eq!(*img.get_pixel(19, 50), BOX_COLOR);
        assert_eq!(*img.get_pixel(50, 81), BOX_COLOR);
        assert_eq!(*img.get_pixel(50, 50), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(5, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_box_clipped_to_frame() {
        let mut img = RgbImage::new(10, 10);
        draw_box(&mut img, &BoundingBox::new(-50.0, -50.0, 500.0, 500.0), BOX_COLOR, 15);
        // Every edge is outside the frame, so nothing is drawn.
        assert_eq!(*img.get_pixel(5, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_save_writes_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySnapshotSink::new(dir.path().join("frames")).unwrap();
        let frame = RgbImage::new(64, 48);

        let path = sink
            .save(7, &frame, &BoundingBox::new(10.0, 10.0, 30.0, 30.0))
            .unwrap();
        assert_eq!(path, dir.path().join("frames").join("frame_000007.jpg"));
        assert!(path.exists());
    }
}
