// Detection statistics - latency and accuracy accounting
//
// Updated under the same lock as ring insertion so a detection costs exactly
// one lock acquisition. Exposed to callers as a cloned read-only snapshot.

use serde::{Deserialize, Serialize};

/// Running detection statistics snapshot.
///
/// `min_latency_ns` starts at `u64::MAX` until the first detection lands.
/// The false positive/negative counters are part of the recorded data model
/// but are not driven by any operation in this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionStatistics {
    pub total_detections: u64,
    pub confirmed_detections: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    /// Confirmed over total, in [0, 1]
    pub detection_accuracy: f64,
    pub min_latency_ns: u64,
    pub max_latency_ns: u64,
    pub avg_latency_ns: u64,
}

impl Default for DetectionStatistics {
    fn default() -> Self {
        Self {
            total_detections: 0,
            confirmed_detections: 0,
            false_positives: 0,
            false_negatives: 0,
            detection_accuracy: 0.0,
            min_latency_ns: u64::MAX,
            max_latency_ns: 0,
            avg_latency_ns: 0,
        }
    }
}

impl DetectionStatistics {
    /// Account for one stored detection and its measured latency.
    ///
    /// Maintains min/max and the incremental mean
    /// `mean = (mean * (n - 1) + new) / n`.
    pub fn record_detection(&mut self, latency_ns: u64) {
        self.total_detections += 1;

        if latency_ns < self.min_latency_ns {
            self.min_latency_ns = latency_ns;
        }
        if latency_ns > self.max_latency_ns {
            self.max_latency_ns = latency_ns;
        }

        let n = self.total_detections;
        self.avg_latency_ns = (self.avg_latency_ns * (n - 1) + latency_ns) / n;

        // Accuracy denominator grew
        self.detection_accuracy = self.confirmed_detections as f64 / n as f64;
    }

    /// Account for one confirmed detection and refresh the accuracy ratio.
    pub fn record_confirmation(&mut self) {
        self.confirmed_detections += 1;
        if self.total_detections > 0 {
            self.detection_accuracy =
                self.confirmed_detections as f64 / self.total_detections as f64;
        }
    }
}
