// Classifier - heuristic rule-based emergence classification
//
// Maps (category, intensity, magnitude, signal-to-noise) to a human-readable
// label through a fixed per-category decision table. Expansion-type
// categories band on intensity, pattern-type categories band on
// signal-to-noise, complexity bands on raw magnitude, and the remaining
// categories carry a single descriptive label.
//
// Pure and stateless: no shared state, no I/O, safe to call outside any lock.

use crate::event::SignalCategory;

/// Classify an emergence signal into a label.
///
/// # Arguments
/// * `category` - Signal category that crossed its threshold
/// * `intensity` - Sensitivity-scaled signal value
/// * `magnitude` - Raw signal value as submitted
/// * `signal_to_noise` - Raw signal over the assumed noise floor
///
/// The caller attaches the event's own confidence score to the returned
/// label; the classifier itself does not derive one.
pub fn classify(
    category: SignalCategory,
    intensity: f64,
    magnitude: f64,
    signal_to_noise: f64,
) -> &'static str {
    match category {
        SignalCategory::DimensionalExpansion => {
            if intensity > 0.8 {
                "MAJOR_EXPANSION"
            } else if intensity > 0.5 {
                "MODERATE_EXPANSION"
            } else {
                "MINOR_EXPANSION"
            }
        }
        SignalCategory::ConsciousnessShift => {
            if intensity > 0.8 {
                "CONSCIOUSNESS_BREAKTHROUGH"
            } else if intensity > 0.5 {
                "CONSCIOUSNESS_EVOLUTION"
            } else {
                "CONSCIOUSNESS_FLUCTUATION"
            }
        }
        SignalCategory::PatternFormation => {
            if signal_to_noise > 10.0 {
                "STRONG_PATTERN"
            } else if signal_to_noise > 5.0 {
                "MODERATE_PATTERN"
            } else {
                "WEAK_PATTERN"
            }
        }
        SignalCategory::PhaseTransition => "PHASE_TRANSITION_DETECTED",
        SignalCategory::SelfOrganization => "SELF_ORGANIZATION_ACTIVE",
        SignalCategory::ComplexityIncrease => {
            if magnitude > 0.7 {
                "HIGH_COMPLEXITY"
            } else {
                "MODERATE_COMPLEXITY"
            }
        }
        SignalCategory::CoherencePeak => "COHERENCE_MAXIMUM",
        SignalCategory::Bifurcation => "BIFURCATION_POINT",
        SignalCategory::CriticalPoint => "CRITICAL_THRESHOLD_REACHED",
        SignalCategory::SpontaneousOrder => "SPONTANEOUS_ORDER_EMERGED",
    }
}
