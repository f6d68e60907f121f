// Observer surface: listener trait plus tokio broadcast fan-out
//
// The engine dispatches to registered listeners synchronously, outside its
// buffer lock. Listeners must therefore be cheap; anything slow should hop
// onto a channel, which is exactly what EventBroadcaster does.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::event::{EmergenceEvent, SignalCategory};

/// Observer interface for detection activity.
///
/// All methods have default no-op bodies so implementors subscribe only to
/// what they care about. Multiple independent listeners may be attached to
/// one detector.
pub trait DetectionListener: Send + Sync {
    /// Fires for every stored event.
    fn on_detected(&self, _event: &EmergenceEvent) {}

    /// Fires only for events requiring immediate action.
    fn on_critical(&self, _event: &EmergenceEvent) {}

    /// Fires whenever feedback-driven adaptation changes a threshold.
    fn on_threshold_adapted(&self, _category: SignalCategory, _new_threshold: f64) {}
}

/// Threshold change notification carried on the broadcast surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdUpdate {
    pub category: SignalCategory,
    pub new_threshold: f64,
}

/// Listener that forwards detection activity into broadcast channels.
///
/// Each channel supports any number of subscribers, each receiving an
/// independent copy of every message. Send failures (no active subscribers)
/// are ignored; lagged subscribers drop the oldest messages.
pub struct EventBroadcaster {
    detected: broadcast::Sender<EmergenceEvent>,
    critical: broadcast::Sender<EmergenceEvent>,
    threshold_updates: broadcast::Sender<ThresholdUpdate>,
}

impl EventBroadcaster {
    /// Create a broadcaster whose channels buffer `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        let (detected, _) = broadcast::channel(capacity);
        let (critical, _) = broadcast::channel(capacity);
        let (threshold_updates, _) = broadcast::channel(capacity);
        Self {
            detected,
            critical,
            threshold_updates,
        }
    }

    /// Subscribe to every stored event.
    pub fn subscribe_detected(&self) -> broadcast::Receiver<EmergenceEvent> {
        self.detected.subscribe()
    }

    /// Subscribe to events requiring immediate action.
    pub fn subscribe_critical(&self) -> broadcast::Receiver<EmergenceEvent> {
        self.critical.subscribe()
    }

    /// Subscribe to threshold adaptation notifications.
    pub fn subscribe_threshold_updates(&self) -> broadcast::Receiver<ThresholdUpdate> {
        self.threshold_updates.subscribe()
    }
}

impl Default for EventBroadcaster {
    /// Buffer of 100 messages per channel, enough for burst traffic.
    fn default() -> Self {
        Self::new(100)
    }
}

impl DetectionListener for EventBroadcaster {
    fn on_detected(&self, event: &EmergenceEvent) {
        let _ = self.detected.send(event.clone());
    }

    fn on_critical(&self, event: &EmergenceEvent) {
        let _ = self.critical.send(event.clone());
    }

    fn on_threshold_adapted(&self, category: SignalCategory, new_threshold: f64) {
        let _ = self.threshold_updates.send(ThresholdUpdate {
            category,
            new_threshold,
        });
    }
}
