mod assigner;
mod matching;

pub use assigner::{AssignerConfig, IdentityAssigner};
pub use matching::{AssignmentResult, iou_distance, linear_assignment};
