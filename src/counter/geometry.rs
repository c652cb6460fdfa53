//! Sidedness of a point relative to the counting line.

use std::str::FromStr;

use nalgebra::Point2;

use crate::error::{Error, Result};

/// Infinite reference line through two distinct points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    start: Point2<f32>,
    end: Point2<f32>,
}

impl Line {
    /// Create a line from two endpoints, rejecting degenerate input.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self> {
        let start = Point2::new(x1, y1);
        let end = Point2::new(x2, y2);
        let finite = [x1, y1, x2, y2].iter().all(|v| v.is_finite());
        if !finite || start == end {
            return Err(Error::DegenerateLine);
        }
        Ok(Self { start, end })
    }

    /// Horizontal line across the middle of a `width` x `height` frame.
    ///
    /// Integer division matches how frame sizes are reported, and the end
    /// x is clamped to 1 so that a 1-pixel-wide frame still yields a line.
    pub fn horizontal_midline(width: u32, height: u32) -> Self {
        let y = (height / 2) as f32;
        let x2 = width.saturating_sub(1).max(1) as f32;
        Self {
            start: Point2::new(0.0, y),
            end: Point2::new(x2, y),
        }
    }

    #[inline]
    pub fn start(&self) -> Point2<f32> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Point2<f32> {
        self.end
    }

    /// Endpoints as `[x1, y1, x2, y2]`.
    pub fn to_xyxy(&self) -> [f32; 4] {
        [self.start.x, self.start.y, self.end.x, self.end.y]
    }
}

impl FromStr for Line {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<i32> = s
            .split(',')
            .map(|p| p.trim().parse::<i32>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| Error::InvalidLine(s.to_string()))?;

        match parts.as_slice() {
            &[x1, y1, x2, y2] => Line::new(x1 as f32, y1 as f32, x2 as f32, y2 as f32),
            _ => Err(Error::InvalidLine(s.to_string())),
        }
    }
}

/// Which half-plane of a line a point occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Negative,
    /// Exactly on the line; never confirms or triggers a crossing.
    OnLine,
    Positive,
}

impl Side {
    /// Classify `point` against `line`.
    #[inline]
    pub fn of(point: Point2<f32>, line: &Line) -> Self {
        Self::from_value(side_value(point, line))
    }

    /// Sign of a raw orientation value. NaN maps to `OnLine`.
    pub fn from_value(value: f32) -> Self {
        if value > 0.0 {
            Side::Positive
        } else if value < 0.0 {
            Side::Negative
        } else {
            Side::OnLine
        }
    }

    pub fn signum(self) -> i8 {
        match self {
            Side::Negative => -1,
            Side::OnLine => 0,
            Side::Positive => 1,
        }
    }

    /// True when both sides are informative and differ.
    pub fn is_flip_from(self, previous: Side) -> bool {
        self != Side::OnLine && previous != Side::OnLine && self != previous
    }
}

/// Signed orientation of `point` relative to `line`.
///
/// Cross product of (point - start) and the line direction. Only the sign is
/// meaningful.
#[inline]
pub fn side_value(point: Point2<f32>, line: &Line) -> f32 {
    (point - line.start).perp(&(line.end - line.start))
}
