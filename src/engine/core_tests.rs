// Tests for the detection pipeline core

use std::sync::{Arc, Mutex};

use super::*;
use crate::config::{DetectorConfig, ThresholdDefaults};
use crate::event::{CriticalityLevel, DetectionState, EventId, SignalCategory};
use crate::listener::DetectionListener;

/// Detector with a wide-open threshold range so tests can pin exact values.
fn test_detector(capacity: usize) -> EmergenceDetector {
    EmergenceDetector::with_config(DetectorConfig {
        buffer_capacity: capacity,
        thresholds: ThresholdDefaults {
            initial: 0.5,
            min: 0.0,
            max: 1.0,
            adaptation_rate: 0.1,
            sensitivity: 0.5,
        },
        ..DetectorConfig::default()
    })
}

/// Detector tuned so every test signal in [t, 1] is detected unscaled.
fn gated_detector(capacity: usize, threshold: f64) -> EmergenceDetector {
    let detector = test_detector(capacity);
    detector
        .set_threshold(SignalCategory::PatternFormation, threshold)
        .unwrap();
    detector
        .set_sensitivity(SignalCategory::PatternFormation, 1.0)
        .unwrap();
    detector
}

struct RecordingListener {
    detected: Mutex<Vec<EventId>>,
    critical: Mutex<Vec<EventId>>,
    adapted: Mutex<Vec<(SignalCategory, f64)>>,
}

impl RecordingListener {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            detected: Mutex::new(Vec::new()),
            critical: Mutex::new(Vec::new()),
            adapted: Mutex::new(Vec::new()),
        })
    }
}

impl DetectionListener for RecordingListener {
    fn on_detected(&self, event: &EmergenceEvent) {
        self.detected.lock().unwrap().push(event.id);
    }

    fn on_critical(&self, event: &EmergenceEvent) {
        self.critical.lock().unwrap().push(event.id);
    }

    fn on_threshold_adapted(&self, category: SignalCategory, new_threshold: f64) {
        self.adapted.lock().unwrap().push((category, new_threshold));
    }
}

#[test]
fn test_threshold_gate_detects_at_or_above() {
    let detector = gated_detector(16, 0.3);

    assert!(detector.detect(SignalCategory::PatternFormation, 0.8, "above"));
    assert!(!detector.detect(SignalCategory::PatternFormation, 0.29, "below"));
    // Equality crosses the gate
    assert!(detector.detect(SignalCategory::PatternFormation, 0.3, "at threshold"));
}

#[test]
fn test_detected_event_metrics() {
    let detector = gated_detector(16, 0.3);
    let id = detector
        .try_detect(SignalCategory::PatternFormation, 0.8, "metric check")
        .unwrap()
        .expect("signal above threshold must detect");

    let event = detector.get_event_by_id(id).unwrap();
    assert_eq!(event.id, id);
    assert_eq!(event.category, SignalCategory::PatternFormation);
    assert_eq!(event.state, DetectionState::Detected);
    assert!((event.intensity - 0.8).abs() < 1e-12);
    // confidence = (0.8 - 0.3) / (1 - 0.3)
    assert!((event.confidence - 0.714_285_714).abs() < 1e-6);
    assert!((event.magnitude - 0.8).abs() < 1e-12);
    assert!((event.signal_to_noise - 8.0).abs() < 1e-9);
    assert_eq!(event.noise_level, 0.1);
    assert!(event.is_authentic);
    assert!(event.confirmed_at.is_none());
    assert_eq!(event.description, "metric check");
}

#[test]
fn test_sensitivity_scales_signal_before_gate() {
    let detector = test_detector(16);
    detector
        .set_threshold(SignalCategory::Bifurcation, 0.5)
        .unwrap();
    detector
        .set_sensitivity(SignalCategory::Bifurcation, 0.5)
        .unwrap();

    // 0.8 * 0.5 = 0.4 < 0.5: below threshold after scaling
    assert!(!detector.detect(SignalCategory::Bifurcation, 0.8, "scaled out"));
    // 1.0 * 0.5 = 0.5: crosses
    assert!(detector.detect(SignalCategory::Bifurcation, 1.0, "scaled in"));

    let event = detector.get_latest_event().unwrap();
    assert!((event.intensity - 0.5).abs() < 1e-12);
    assert!((event.magnitude - 1.0).abs() < 1e-12);
}

#[test]
fn test_below_threshold_stores_nothing() {
    let detector = gated_detector(16, 0.3);
    assert_eq!(
        detector.try_detect(SignalCategory::PatternFormation, 0.1, "quiet"),
        Ok(None)
    );
    assert!(detector.get_latest_event().is_none());
    assert_eq!(detector.get_statistics().total_detections, 0);
}

#[test]
fn test_non_finite_signal_is_invalid_input() {
    let detector = gated_detector(16, 0.3);

    assert!(matches!(
        detector.try_detect(SignalCategory::PatternFormation, f64::NAN, "nan"),
        Err(DetectorError::SignalNotFinite { .. })
    ));
    assert!(matches!(
        detector.try_detect(SignalCategory::PatternFormation, f64::INFINITY, "inf"),
        Err(DetectorError::SignalNotFinite { .. })
    ));

    // The boolean surface conflates this with below-threshold
    assert!(!detector.detect(SignalCategory::PatternFormation, f64::NAN, "nan"));
    assert_eq!(detector.get_statistics().total_detections, 0);
}

#[test]
fn test_criticality_breakpoints_through_pipeline() {
    let detector = gated_detector(16, 0.2);
    let cases = [
        (0.95, CriticalityLevel::Emergency, true),
        (0.8, CriticalityLevel::Critical, true),
        (0.65, CriticalityLevel::High, false),
        (0.5, CriticalityLevel::Moderate, false),
        (0.35, CriticalityLevel::Low, false),
    ];

    for (signal, expected, immediate) in cases {
        let id = detector
            .try_detect(SignalCategory::PatternFormation, signal, "breakpoint")
            .unwrap()
            .expect("all case signals cross the 0.2 threshold");
        let event = detector.get_event_by_id(id).unwrap();
        assert_eq!(event.criticality, expected, "signal {}", signal);
        assert_eq!(
            event.requires_immediate_action, immediate,
            "signal {}",
            signal
        );
    }
}

#[test]
fn test_ids_are_monotonic_without_gaps() {
    let detector = gated_detector(64, 0.1);
    let mut ids = Vec::new();
    for _ in 0..20 {
        let id = detector
            .try_detect(SignalCategory::PatternFormation, 0.9, "seq")
            .unwrap()
            .unwrap();
        ids.push(id);
    }
    let expected: Vec<EventId> = (1..=20).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_ring_overwrite_makes_oldest_unreachable() {
    let detector = gated_detector(4, 0.1);
    for _ in 0..5 {
        detector.detect(SignalCategory::PatternFormation, 0.9, "fill");
    }

    let stats = detector.get_statistics();
    assert_eq!(stats.total_detections, 5);
    assert!(detector.get_event_by_id(1).is_none(), "oldest must be evicted");
    for id in 2..=5 {
        assert!(detector.get_event_by_id(id).is_some(), "id {} reachable", id);
    }
    assert_eq!(detector.get_latest_event().map(|event| event.id), Some(5));
}

#[test]
fn test_confirmation_flips_state_and_accuracy() {
    let detector = gated_detector(16, 0.1);
    let id = detector
        .try_detect(SignalCategory::PatternFormation, 0.9, "to confirm")
        .unwrap()
        .unwrap();

    assert!(detector.confirm(id));

    let event = detector.get_event_by_id(id).unwrap();
    assert_eq!(event.state, DetectionState::Confirmed);
    assert!(event.confirmed_at.is_some());
    assert!(event.confirmed_at.unwrap() > event.detected_at);

    let stats = detector.get_statistics();
    assert_eq!(stats.confirmed_detections, 1);
    assert!((stats.detection_accuracy - 1.0).abs() < 1e-12);
}

#[test]
fn test_confirmation_is_idempotent() {
    let detector = gated_detector(16, 0.1);
    let id = detector
        .try_detect(SignalCategory::PatternFormation, 0.9, "confirm twice")
        .unwrap()
        .unwrap();

    assert!(detector.confirm(id));
    assert!(!detector.confirm(id), "second confirmation must be a no-op");
    assert_eq!(detector.get_statistics().confirmed_detections, 1);
}

#[test]
fn test_confirming_unknown_or_evicted_id_is_noop() {
    let detector = gated_detector(2, 0.1);
    assert!(!detector.confirm(0));
    assert!(!detector.confirm(99));

    for _ in 0..3 {
        detector.detect(SignalCategory::PatternFormation, 0.9, "fill");
    }
    // Event 1 was evicted by the third insertion
    assert!(!detector.confirm(1));
    assert_eq!(detector.get_statistics().confirmed_detections, 0);
}

#[test]
fn test_auto_classification_attaches_label() {
    let detector = gated_detector(16, 0.2);

    // Disabled by default
    detector.detect(SignalCategory::PatternFormation, 0.9, "unclassified");
    assert!(detector.get_latest_event().unwrap().classification.is_none());

    detector.enable_auto_classification();
    detector.detect(SignalCategory::PatternFormation, 0.9, "classified");

    let event = detector.get_latest_event().unwrap();
    let classification = event.classification.expect("classification enabled");
    // signal_to_noise = 0.9 / 0.1 = 9.0, in the moderate band
    assert_eq!(classification.label, "MODERATE_PATTERN");
    assert!((classification.confidence - event.confidence).abs() < 1e-12);
}

#[test]
fn test_listener_dispatch() {
    let detector = gated_detector(16, 0.2);
    let listener = RecordingListener::new();
    detector.add_listener(listener.clone());

    // Below threshold: no dispatch
    detector.detect(SignalCategory::PatternFormation, 0.1, "quiet");
    // Moderate event: detected only
    let moderate = detector
        .try_detect(SignalCategory::PatternFormation, 0.5, "moderate")
        .unwrap()
        .unwrap();
    // Emergency event: detected and critical
    let emergency = detector
        .try_detect(SignalCategory::PatternFormation, 0.95, "emergency")
        .unwrap()
        .unwrap();

    assert_eq!(*listener.detected.lock().unwrap(), vec![moderate, emergency]);
    assert_eq!(*listener.critical.lock().unwrap(), vec![emergency]);
    assert!(listener.adapted.lock().unwrap().is_empty());
}

#[test]
fn test_multiple_listeners_all_notified() {
    let detector = gated_detector(16, 0.2);
    let first = RecordingListener::new();
    let second = RecordingListener::new();
    detector.add_listener(first.clone());
    detector.add_listener(second.clone());

    detector.detect(SignalCategory::PatternFormation, 0.5, "fan out");

    assert_eq!(first.detected.lock().unwrap().len(), 1);
    assert_eq!(second.detected.lock().unwrap().len(), 1);
}

#[test]
fn test_adaptation_runs_after_detection_when_enabled() {
    let detector = gated_detector(16, 0.3);
    let listener = RecordingListener::new();
    detector.add_listener(listener.clone());
    detector.enable_adaptive_thresholds();

    let before = detector.get_current_threshold(SignalCategory::PatternFormation);
    detector.detect(SignalCategory::PatternFormation, 0.9, "adapt");
    let after = detector.get_current_threshold(SignalCategory::PatternFormation);

    // Threshold moved toward the observed intensity (0.9 > 0.3)
    assert!(after > before);
    assert!((after - (before + 0.1 * (0.9 - before))).abs() < 1e-12);

    let adapted = listener.adapted.lock().unwrap();
    assert_eq!(adapted.len(), 1);
    assert_eq!(adapted[0].0, SignalCategory::PatternFormation);
    assert!((adapted[0].1 - after).abs() < 1e-12);

    let record = detector
        .get_threshold_record(SignalCategory::PatternFormation)
        .unwrap();
    assert_eq!(record.adaptation_count, 1);
}

#[test]
fn test_no_adaptation_when_disabled() {
    let detector = gated_detector(16, 0.3);
    detector.detect(SignalCategory::PatternFormation, 0.9, "static");
    assert_eq!(
        detector.get_current_threshold(SignalCategory::PatternFormation),
        0.3
    );
}

#[test]
fn test_description_is_truncated_not_rejected() {
    let detector = EmergenceDetector::with_config(DetectorConfig {
        buffer_capacity: 4,
        description_max_len: 10,
        thresholds: ThresholdDefaults {
            initial: 0.1,
            min: 0.0,
            max: 1.0,
            adaptation_rate: 0.1,
            sensitivity: 1.0,
        },
        ..DetectorConfig::default()
    });

    assert!(detector.detect(
        SignalCategory::CoherencePeak,
        0.9,
        "this description is far longer than the configured bound"
    ));
    let event = detector.get_latest_event().unwrap();
    assert_eq!(event.description, "this descr");
    assert_eq!(event.description.chars().count(), 10);
}

#[test]
fn test_latency_statistics_populated() {
    let detector = gated_detector(64, 0.1);
    for _ in 0..10 {
        detector.detect(SignalCategory::PatternFormation, 0.9, "latency");
    }

    let stats = detector.get_statistics();
    assert_eq!(stats.total_detections, 10);
    assert_ne!(stats.min_latency_ns, u64::MAX);
    assert!(stats.min_latency_ns <= stats.avg_latency_ns);
    assert!(stats.avg_latency_ns <= stats.max_latency_ns);

    let event = detector.get_latest_event().unwrap();
    assert!(event.latency_ns <= stats.max_latency_ns);
}

#[test]
fn test_default_sensitivity_halves_signal() {
    // Stock defaults: threshold 0.5, sensitivity 0.5
    let detector = EmergenceDetector::new(8);
    assert!(!detector.detect(SignalCategory::SelfOrganization, 0.8, "0.4 < 0.5"));
    assert!(detector.detect(SignalCategory::SelfOrganization, 1.0, "0.5 >= 0.5"));
}

#[test]
fn test_status_report_mentions_counts() {
    let detector = gated_detector(16, 0.1);
    detector.enable_real_time_mode();
    detector.detect(SignalCategory::PatternFormation, 0.9, "report");

    let report = detector.status_report();
    assert!(report.contains("Total detections: 1"));
    assert!(report.contains("Real-time mode: true"));
    assert!(report.contains("Buffer usage: 1/16"));
}

#[test]
#[should_panic(expected = "capacity must be greater than 0")]
fn test_zero_capacity_is_fatal() {
    EmergenceDetector::new(0);
}

#[test]
fn test_instances_are_independent() {
    let first = gated_detector(8, 0.1);
    let second = gated_detector(8, 0.1);

    first.detect(SignalCategory::PatternFormation, 0.9, "only in first");

    assert_eq!(first.get_statistics().total_detections, 1);
    assert_eq!(second.get_statistics().total_detections, 0);
    assert!(second.get_latest_event().is_none());
    // Both assign IDs from their own counters
    let id = second
        .try_detect(SignalCategory::PatternFormation, 0.9, "first in second")
        .unwrap()
        .unwrap();
    assert_eq!(id, 1);
}
