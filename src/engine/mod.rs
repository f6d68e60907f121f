// Detection engine: event storage, statistics, and the pipeline core

pub mod core;
pub mod ring;
pub mod stats;

pub use self::core::EmergenceDetector;
pub use ring::EventRing;
pub use stats::DetectionStatistics;
