// Event data model shared across the detection pipeline
//
// Defines the closed set of signal categories, the ordered criticality scale
// derived from intensity, the detection state machine, and the fully
// populated emergence event record stored in the ring buffer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clock::DetectionTimestamp;

/// Unique event identifier. Assigned from 1 upward, never reused; 0 is the
/// "no event" sentinel and is never handed out by the engine.
pub type EventId = u64;

/// Closed set of signal categories the engine can monitor.
///
/// Each category owns one adaptive threshold record and one classification
/// rule. The set is fixed at compile time; untyped boundary callers go
/// through [`SignalCategory::from_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    DimensionalExpansion,
    ConsciousnessShift,
    PatternFormation,
    PhaseTransition,
    SelfOrganization,
    ComplexityIncrease,
    CoherencePeak,
    Bifurcation,
    CriticalPoint,
    SpontaneousOrder,
}

impl SignalCategory {
    /// Number of categories in the closed set.
    pub const COUNT: usize = 10;

    /// All categories, in stable index order.
    pub const ALL: [SignalCategory; Self::COUNT] = [
        SignalCategory::DimensionalExpansion,
        SignalCategory::ConsciousnessShift,
        SignalCategory::PatternFormation,
        SignalCategory::PhaseTransition,
        SignalCategory::SelfOrganization,
        SignalCategory::ComplexityIncrease,
        SignalCategory::CoherencePeak,
        SignalCategory::Bifurcation,
        SignalCategory::CriticalPoint,
        SignalCategory::SpontaneousOrder,
    ];

    /// Stable zero-based index of this category.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a category by its stable index.
    ///
    /// Returns `None` for indices outside the fixed ten-entry set; this is
    /// where out-of-range categories from untyped callers are rejected.
    pub fn from_index(index: usize) -> Option<SignalCategory> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalCategory::DimensionalExpansion => "DIMENSIONAL_EXPANSION",
            SignalCategory::ConsciousnessShift => "CONSCIOUSNESS_SHIFT",
            SignalCategory::PatternFormation => "PATTERN_FORMATION",
            SignalCategory::PhaseTransition => "PHASE_TRANSITION",
            SignalCategory::SelfOrganization => "SELF_ORGANIZATION",
            SignalCategory::ComplexityIncrease => "COMPLEXITY_INCREASE",
            SignalCategory::CoherencePeak => "COHERENCE_PEAK",
            SignalCategory::Bifurcation => "BIFURCATION",
            SignalCategory::CriticalPoint => "CRITICAL_POINT",
            SignalCategory::SpontaneousOrder => "SPONTANEOUS_ORDER",
        };
        f.write_str(name)
    }
}

/// Ordered severity scale derived from event intensity.
///
/// Declaration order gives `Low < Moderate < High < Critical < Emergency`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CriticalityLevel {
    Low,
    Moderate,
    High,
    Critical,
    Emergency,
}

impl CriticalityLevel {
    /// Derive the criticality level from event intensity.
    ///
    /// Fixed breakpoints: >0.9 Emergency, >0.75 Critical, >0.6 High,
    /// >0.4 Moderate, else Low.
    pub fn from_intensity(intensity: f64) -> CriticalityLevel {
        if intensity > 0.9 {
            CriticalityLevel::Emergency
        } else if intensity > 0.75 {
            CriticalityLevel::Critical
        } else if intensity > 0.6 {
            CriticalityLevel::High
        } else if intensity > 0.4 {
            CriticalityLevel::Moderate
        } else {
            CriticalityLevel::Low
        }
    }
}

impl fmt::Display for CriticalityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CriticalityLevel::Low => "LOW",
            CriticalityLevel::Moderate => "MODERATE",
            CriticalityLevel::High => "HIGH",
            CriticalityLevel::Critical => "CRITICAL",
            CriticalityLevel::Emergency => "EMERGENCY",
        };
        f.write_str(name)
    }
}

/// Detection state machine.
///
/// The engine only drives `Detected` (on successful detection) and
/// `Confirmed` (on explicit confirmation). `ThresholdApproaching` and
/// `Completed` are reserved extension points with no driving logic here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionState {
    Monitoring,
    ThresholdApproaching,
    Detected,
    Confirmed,
    Completed,
}

impl fmt::Display for DetectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectionState::Monitoring => "MONITORING",
            DetectionState::ThresholdApproaching => "THRESHOLD_APPROACHING",
            DetectionState::Detected => "DETECTED",
            DetectionState::Confirmed => "CONFIRMED",
            DetectionState::Completed => "COMPLETED",
        };
        f.write_str(name)
    }
}

/// Label and confidence attached by the automatic classifier.
///
/// Confidence is copied from the event's own confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub confidence: f64,
}

/// A recorded instance of a signal crossing its category's threshold.
///
/// Fully populated at detection time; mutated exactly once more, by
/// confirmation. Reclaimed implicitly when the ring buffer overwrites the
/// oldest slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergenceEvent {
    /// Unique monotonically increasing ID (starts at 1, never reused)
    pub id: EventId,
    pub category: SignalCategory,
    pub criticality: CriticalityLevel,
    pub state: DetectionState,
    pub detected_at: DetectionTimestamp,
    pub confirmed_at: Option<DetectionTimestamp>,
    /// Wall time spent inside the pipeline's measurement window, including
    /// the buffer critical section
    pub latency_ns: u64,
    /// Free-text description, truncated to the configured bound
    pub description: String,
    /// Sensitivity-scaled signal value that crossed the threshold
    pub intensity: f64,
    /// Threshold-overshoot confidence score
    pub confidence: f64,
    /// Raw signal value as submitted
    pub magnitude: f64,
    /// Observed signal strength (raw signal value)
    pub signal_strength: f64,
    /// Assumed noise floor at detection time
    pub noise_level: f64,
    pub signal_to_noise: f64,
    /// Populated only when auto-classification is enabled
    pub classification: Option<Classification>,
    /// Always true for events produced by the real pipeline; lets fabricated
    /// or injected events be told apart
    pub is_authentic: bool,
    pub requires_immediate_action: bool,
}
