// Signal analysis: adaptive thresholding and rule-based classification

pub mod classifier;
pub mod threshold;

pub use classifier::classify;
pub use threshold::{AdaptiveThreshold, ThresholdBank};
