//! IoU association between active tracks and fresh detections.

use ndarray::Array2;

use crate::counter::{BoundingBox, iou_batch};

/// Cost used for pairs that must never be matched (different classes,
/// padding rows and columns).
pub(crate) const FORBIDDEN_COST: f32 = 1e6;

/// Compute the IoU distance matrix (1 - IoU) between tracks and detections.
pub fn iou_distance(track_boxes: &[BoundingBox], det_boxes: &[BoundingBox]) -> Array2<f32> {
    iou_batch(track_boxes, det_boxes).mapv(|iou| 1.0 - iou)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Solve the assignment problem on `cost_matrix`, keeping only pairs whose
/// cost does not exceed `thresh`.
pub fn linear_assignment(cost_matrix: &Array2<f32>, thresh: f32) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();
    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
        };
    }

    // lapjv wants a square matrix.
    let size = num_rows.max(num_cols);
    let padded = Array2::<f64>::from_shape_fn((size, size), |(i, j)| {
        if i < num_rows && j < num_cols {
            cost_matrix[[i, j]] as f64
        } else {
            FORBIDDEN_COST as f64
        }
    });

    let mut result = AssignmentResult::default();
    let mut det_matched = vec![false; num_cols];

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row, &col) in row_to_col.iter().enumerate().take(num_rows) {
                if col < num_cols && cost_matrix[[row, col]] <= thresh {
                    result.matches.push((row, col));
                    det_matched[col] = true;
                } else {
                    result.unmatched_tracks.push(row);
                }
            }
        }
        Err(_) => result.unmatched_tracks = (0..num_rows).collect(),
    }

    result.unmatched_detections = det_matched
        .iter()
        .enumerate()
        .filter_map(|(j, &matched)| (!matched).then_some(j))
        .collect();
    result
}
