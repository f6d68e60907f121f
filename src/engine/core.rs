// EmergenceDetector - the real-time detection pipeline
//
// A passive, synchronously-invoked engine: caller threads feed categorized
// signal readings through `detect`/`try_detect`, which gate them against the
// category's adaptive threshold, derive the event metrics outside any lock,
// and take the single buffer mutex only to assign an ID, store the event,
// and update the statistics. Callbacks and threshold adaptation run after
// the lock is released.
//
// Latency accounting: the measurement window opens on entry and closes with
// a second timestamp captured while the buffer lock is still held, right
// after the event is stored, so the recorded latency covers the critical
// section and only one lock acquisition happens per detection.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use log::{error, info};

use crate::analysis::classifier::classify;
use crate::analysis::threshold::{AdaptiveThreshold, ThresholdBank};
use crate::clock::{self, DetectionTimestamp};
use crate::config::DetectorConfig;
use crate::engine::ring::EventRing;
use crate::engine::stats::DetectionStatistics;
use crate::error::{log_detector_error, DetectorError};
use crate::event::{
    Classification, CriticalityLevel, DetectionState, EmergenceEvent, EventId, SignalCategory,
};
use crate::listener::DetectionListener;

/// Floor applied to the confidence denominator `1 - threshold` so a
/// threshold at the top of its range cannot divide by zero.
const CONFIDENCE_DENOM_FLOOR: f64 = 1e-9;

/// State guarded by the single buffer mutex: the event ring and the
/// statistics it feeds. Keeping both behind one lock makes a detection cost
/// exactly one acquisition.
struct CoreState {
    ring: EventRing,
    stats: DetectionStatistics,
}

/// Real-time emergence detection engine.
///
/// Each instance owns independent state and is safe to share across threads
/// behind an `Arc`. The engine runs no background threads and never blocks
/// on I/O; the only blocking is the short buffer mutex around insertion.
pub struct EmergenceDetector {
    config: DetectorConfig,
    real_time_mode: AtomicBool,
    adaptive_thresholds: AtomicBool,
    auto_classification: AtomicBool,
    thresholds: ThresholdBank,
    core: Mutex<CoreState>,
    listeners: RwLock<Vec<Arc<dyn DetectionListener>>>,
    started_at: DetectionTimestamp,
}

impl EmergenceDetector {
    /// Create a detector with the default configuration and the given ring
    /// capacity.
    ///
    /// # Panics
    /// Panics if `buffer_capacity` is 0.
    pub fn new(buffer_capacity: usize) -> Self {
        Self::with_config(DetectorConfig {
            buffer_capacity,
            ..DetectorConfig::default()
        })
    }

    /// Create a detector from an explicit configuration.
    ///
    /// # Panics
    /// Panics if `config.buffer_capacity` is 0.
    pub fn with_config(config: DetectorConfig) -> Self {
        let detector = Self {
            thresholds: ThresholdBank::new(&config.thresholds),
            core: Mutex::new(CoreState {
                ring: EventRing::new(config.buffer_capacity),
                stats: DetectionStatistics::default(),
            }),
            real_time_mode: AtomicBool::new(false),
            adaptive_thresholds: AtomicBool::new(false),
            auto_classification: AtomicBool::new(false),
            listeners: RwLock::new(Vec::new()),
            started_at: clock::capture(),
            config,
        };
        info!(
            "[Detector] activated, buffer capacity = {} events, target < 1 ms",
            detector.config.buffer_capacity
        );
        detector
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    /// Flag the engine as running against a real-time signal source.
    ///
    /// Informational: surfaced in the status report, no driving logic.
    pub fn enable_real_time_mode(&self) {
        self.real_time_mode.store(true, Ordering::Relaxed);
        info!("[Detector] real-time mode enabled");
    }

    /// Enable feedback-driven threshold adaptation on every category.
    pub fn enable_adaptive_thresholds(&self) {
        self.adaptive_thresholds.store(true, Ordering::Relaxed);
        self.thresholds.set_auto_adapt_all(true);
        info!("[Detector] adaptive thresholds enabled");
    }

    /// Attach a classification label to every stored event.
    pub fn enable_auto_classification(&self) {
        self.auto_classification.store(true, Ordering::Relaxed);
        info!("[Detector] auto-classification enabled");
    }

    /// Set the detection threshold for `category`.
    ///
    /// Fails if `value` is outside [0, 1]; the applied value is clamped into
    /// the record's adaptation bounds.
    pub fn set_threshold(
        &self,
        category: SignalCategory,
        value: f64,
    ) -> Result<(), DetectorError> {
        let applied = self.thresholds.set_threshold(category, value)?;
        info!("[Detector] threshold for {} set to {:.2}", category, applied);
        Ok(())
    }

    /// Set the sensitivity multiplier for `category`. Fails outside [0, 1].
    pub fn set_sensitivity(
        &self,
        category: SignalCategory,
        value: f64,
    ) -> Result<(), DetectorError> {
        self.thresholds.set_sensitivity(category, value)?;
        info!("[Detector] sensitivity for {} set to {:.2}", category, value);
        Ok(())
    }

    /// Register an observer. Listeners are invoked outside the buffer lock,
    /// in registration order; multiple independent observers may be attached.
    pub fn add_listener(&self, listener: Arc<dyn DetectionListener>) {
        match self.listeners.write() {
            Ok(mut listeners) => listeners.push(listener),
            Err(_) => error!("[Detector] listener registry lock poisoned, listener dropped"),
        }
    }

    // ========================================================================
    // DETECTION PIPELINE
    // ========================================================================

    /// Run the detection pipeline for one signal reading.
    ///
    /// Returns `Ok(Some(id))` when an event was stored, `Ok(None)` when the
    /// sensitivity-scaled signal stayed below the category threshold (the
    /// common fast-path exit, taken without any lock), and `Err` for invalid
    /// input or a poisoned lock.
    pub fn try_detect(
        &self,
        category: SignalCategory,
        raw_signal: f64,
        description: &str,
    ) -> Result<Option<EventId>, DetectorError> {
        // Latency measurement window opens at entry
        let entered = clock::capture();

        if !raw_signal.is_finite() {
            return Err(DetectorError::SignalNotFinite { value: raw_signal });
        }

        let record = self.thresholds.snapshot(category)?;
        let intensity = raw_signal * record.sensitivity;

        // Fast-path exit: no emergence, no lock taken
        if intensity < record.current {
            return Ok(None);
        }

        let event = self.build_event(category, &record, raw_signal, intensity, entered, description);
        let requires_immediate_action = event.requires_immediate_action;

        // Critical section: ID assignment, storage, latency close, statistics
        let stored = {
            let mut core = self.core.lock().map_err(|_| DetectorError::LockPoisoned {
                component: "event ring",
            })?;
            core.ring.insert(event);
            let latency_ns = clock::capture().nanos_since(entered);
            if let Some(slot) = core.ring.latest_mut() {
                slot.latency_ns = latency_ns;
            }
            core.stats.record_detection(latency_ns);
            core.ring.latest().cloned()
        };

        let Some(stored) = stored else {
            // Unreachable after a successful insert; report rather than panic
            return Err(DetectorError::LockPoisoned {
                component: "event ring",
            });
        };
        let id = stored.id;

        // Callback dispatch and adaptation, outside the lock
        let listeners = self.listener_snapshot();
        for listener in &listeners {
            listener.on_detected(&stored);
        }
        if requires_immediate_action {
            for listener in &listeners {
                listener.on_critical(&stored);
            }
        }

        // The event is already stored; an adaptation failure must not mask it
        if self.adaptive_thresholds.load(Ordering::Relaxed) && record.auto_adapt {
            match self.thresholds.adapt(category, intensity) {
                Ok(new_threshold) => {
                    for listener in &listeners {
                        listener.on_threshold_adapted(category, new_threshold);
                    }
                }
                Err(err) => log_detector_error(&err, "threshold adaptation"),
            }
        }

        Ok(Some(id))
    }

    /// Boolean detection surface.
    ///
    /// Collapses below-threshold, invalid input, and poisoned locks into
    /// `false`; callers that need to tell them apart use
    /// [`EmergenceDetector::try_detect`].
    pub fn detect(&self, category: SignalCategory, raw_signal: f64, description: &str) -> bool {
        match self.try_detect(category, raw_signal, description) {
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(err) => {
                log_detector_error(&err, "detect");
                false
            }
        }
    }

    fn build_event(
        &self,
        category: SignalCategory,
        record: &AdaptiveThreshold,
        raw_signal: f64,
        intensity: f64,
        detected_at: DetectionTimestamp,
        description: &str,
    ) -> EmergenceEvent {
        let denominator = (1.0 - record.current).max(CONFIDENCE_DENOM_FLOOR);
        let confidence = (intensity - record.current) / denominator;

        let noise_level = self.config.noise_floor;
        let signal_to_noise = raw_signal / noise_level;

        let criticality = CriticalityLevel::from_intensity(intensity);
        let requires_immediate_action = criticality >= CriticalityLevel::Critical;

        let classification = if self.auto_classification.load(Ordering::Relaxed) {
            Some(Classification {
                label: classify(category, intensity, raw_signal, signal_to_noise).to_string(),
                confidence,
            })
        } else {
            None
        };

        EmergenceEvent {
            // Placeholder; the ring assigns the real ID under its lock
            id: 0,
            category,
            criticality,
            state: DetectionState::Detected,
            detected_at,
            confirmed_at: None,
            latency_ns: 0,
            description: truncate_description(description, self.config.description_max_len),
            intensity,
            confidence,
            magnitude: raw_signal,
            signal_strength: raw_signal,
            noise_level,
            signal_to_noise,
            classification,
            is_authentic: true,
            requires_immediate_action,
        }
    }

    // ========================================================================
    // CONFIRMATION
    // ========================================================================

    /// Confirm a previously detected event by ID.
    ///
    /// Scans the ring newest to oldest for a `Detected`-state event with a
    /// matching ID; on match, flips it to `Confirmed`, records the
    /// confirmation timestamp, and refreshes the accuracy ratio. Returns
    /// `false` for unknown, already-confirmed, or evicted IDs (a defined
    /// no-op, not an error).
    pub fn confirm(&self, event_id: EventId) -> bool {
        if event_id == 0 {
            return false;
        }

        let mut core = match self.core.lock() {
            Ok(core) => core,
            Err(_) => {
                error!("[Detector] event ring lock poisoned in confirm");
                return false;
            }
        };

        let confirmed = match core.ring.find_mut(event_id) {
            Some(event) if event.state == DetectionState::Detected => {
                event.state = DetectionState::Confirmed;
                event.confirmed_at = Some(clock::capture());
                true
            }
            _ => false,
        };

        if confirmed {
            core.stats.record_confirmation();
        }
        confirmed
    }

    // ========================================================================
    // QUERY SURFACE
    // ========================================================================

    /// Most recently stored event, if any.
    pub fn get_latest_event(&self) -> Option<EmergenceEvent> {
        match self.core.lock() {
            Ok(core) => core.ring.latest().cloned(),
            Err(_) => {
                error!("[Detector] event ring lock poisoned in get_latest_event");
                None
            }
        }
    }

    /// Look up an event by ID. Evicted events are unreachable.
    pub fn get_event_by_id(&self, event_id: EventId) -> Option<EmergenceEvent> {
        match self.core.lock() {
            Ok(core) => core.ring.find(event_id).cloned(),
            Err(_) => {
                error!("[Detector] event ring lock poisoned in get_event_by_id");
                None
            }
        }
    }

    /// Read-only statistics snapshot.
    pub fn get_statistics(&self) -> DetectionStatistics {
        match self.core.lock() {
            Ok(core) => core.stats.clone(),
            Err(_) => {
                error!("[Detector] event ring lock poisoned in get_statistics");
                DetectionStatistics::default()
            }
        }
    }

    /// Current threshold for `category`, or 0.0 if the record is unreadable.
    pub fn get_current_threshold(&self, category: SignalCategory) -> f64 {
        match self.thresholds.snapshot(category) {
            Ok(record) => record.current,
            Err(err) => {
                log_detector_error(&err, "get_current_threshold");
                0.0
            }
        }
    }

    /// Full threshold record for `category`.
    pub fn get_threshold_record(
        &self,
        category: SignalCategory,
    ) -> Result<AdaptiveThreshold, DetectorError> {
        self.thresholds.snapshot(category)
    }

    /// Multi-line textual status dump. Debugging aid, not a contract.
    pub fn status_report(&self) -> String {
        let (ring_len, ring_capacity, stats) = match self.core.lock() {
            Ok(core) => (core.ring.len(), core.ring.capacity(), core.stats.clone()),
            Err(_) => {
                error!("[Detector] event ring lock poisoned in status_report");
                (0, self.config.buffer_capacity, DetectionStatistics::default())
            }
        };

        let mut report = String::new();
        let _ = writeln!(report, "Emergence Detector Status");
        let _ = writeln!(report, "=========================");
        let _ = writeln!(
            report,
            "Real-time mode: {}",
            self.real_time_mode.load(Ordering::Relaxed)
        );
        let _ = writeln!(
            report,
            "Adaptive thresholds: {}",
            self.adaptive_thresholds.load(Ordering::Relaxed)
        );
        let _ = writeln!(
            report,
            "Auto-classification: {}",
            self.auto_classification.load(Ordering::Relaxed)
        );
        let _ = writeln!(
            report,
            "Buffer usage: {}/{} ({:.1}%)",
            ring_len,
            ring_capacity,
            ring_len as f64 / ring_capacity as f64 * 100.0
        );
        let _ = writeln!(report, "Total detections: {}", stats.total_detections);
        let _ = writeln!(report, "Confirmed detections: {}", stats.confirmed_detections);
        let _ = writeln!(
            report,
            "Detection accuracy: {:.2}%",
            stats.detection_accuracy * 100.0
        );
        if stats.total_detections > 0 {
            let _ = writeln!(report, "Min latency: {} ns", stats.min_latency_ns);
            let _ = writeln!(report, "Max latency: {} ns", stats.max_latency_ns);
            let _ = writeln!(report, "Avg latency: {} ns", stats.avg_latency_ns);
        }
        let _ = writeln!(
            report,
            "Uptime: {} ms",
            clock::capture().nanos_since(self.started_at) / 1_000_000
        );

        if stats.total_detections > 0 {
            if stats.avg_latency_ns < 1_000_000 {
                info!(
                    "[Detector] latency target met: {} ns < 1 ms",
                    stats.avg_latency_ns
                );
            } else {
                log::warn!(
                    "[Detector] latency target missed: {} ns >= 1 ms",
                    stats.avg_latency_ns
                );
            }
        }

        report
    }

    fn listener_snapshot(&self) -> Vec<Arc<dyn DetectionListener>> {
        match self.listeners.read() {
            Ok(listeners) => listeners.clone(),
            Err(_) => {
                error!("[Detector] listener registry lock poisoned, dispatch skipped");
                Vec::new()
            }
        }
    }
}

impl Drop for EmergenceDetector {
    fn drop(&mut self) {
        if let Ok(core) = self.core.get_mut() {
            info!(
                "[Detector] deactivated: {} detections, {} confirmed, accuracy {:.2}%, avg latency {} ns",
                core.stats.total_detections,
                core.stats.confirmed_detections,
                core.stats.detection_accuracy * 100.0,
                core.stats.avg_latency_ns
            );
        }
    }
}

/// Truncate a description to at most `max_len` characters.
fn truncate_description(description: &str, max_len: usize) -> String {
    if description.chars().count() <= max_len {
        description.to_string()
    } else {
        description.chars().take(max_len).collect()
    }
}

#[cfg(test)]
#[path = "core_tests.rs"]
mod tests;
