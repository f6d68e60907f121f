// ThresholdBank - adaptive detection thresholds, one record per category
//
// Each record carries the current threshold, its adaptation bounds, an
// adaptation rate, and a sensitivity multiplier applied to raw signals before
// the threshold comparison. Records self-tune toward observed intensities
// when auto-adaptation is on.
//
// Every record sits behind its own RwLock: the detection fast path takes a
// read lock on exactly one record, and configuration or adaptation takes a
// write lock on exactly one record. Concurrent adaptation of the same
// category is therefore serialized, not a data race.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::config::ThresholdDefaults;
use crate::error::DetectorError;
use crate::event::SignalCategory;

/// One tunable threshold record.
///
/// Invariant: `current` stays within `[min, max]` after any update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveThreshold {
    /// Current detection threshold, within [min, max]
    pub current: f64,
    /// Lower adaptation bound
    pub min: f64,
    /// Upper adaptation bound
    pub max: f64,
    /// Fraction of the feedback delta applied per adaptation step, in [0, 1]
    pub adaptation_rate: f64,
    /// Multiplier applied to raw signals before threshold comparison, in [0, 1]
    pub sensitivity: f64,
    /// Whether this record adapts automatically after each detection
    pub auto_adapt: bool,
    /// Number of adaptation steps applied so far
    pub adaptation_count: u64,
}

impl AdaptiveThreshold {
    fn from_defaults(defaults: &ThresholdDefaults) -> Self {
        Self {
            current: defaults.initial.clamp(defaults.min, defaults.max),
            min: defaults.min,
            max: defaults.max,
            adaptation_rate: defaults.adaptation_rate,
            sensitivity: defaults.sensitivity,
            auto_adapt: false,
            adaptation_count: 0,
        }
    }
}

/// Per-category adaptive threshold storage.
pub struct ThresholdBank {
    records: [RwLock<AdaptiveThreshold>; SignalCategory::COUNT],
}

impl ThresholdBank {
    /// Create a bank with every record initialized from `defaults`.
    pub fn new(defaults: &ThresholdDefaults) -> Self {
        Self {
            records: std::array::from_fn(|_| {
                RwLock::new(AdaptiveThreshold::from_defaults(defaults))
            }),
        }
    }

    /// Copy of the record for `category`.
    pub fn snapshot(&self, category: SignalCategory) -> Result<AdaptiveThreshold, DetectorError> {
        let record = self.records[category.index()]
            .read()
            .map_err(|_| DetectorError::LockPoisoned {
                component: "threshold record",
            })?;
        Ok(*record)
    }

    /// Set the detection threshold for `category`.
    ///
    /// Fails if `value` is outside [0, 1]; the accepted value is then clamped
    /// into the record's `[min, max]` bounds so the record invariant holds.
    /// Returns the threshold actually applied.
    pub fn set_threshold(
        &self,
        category: SignalCategory,
        value: f64,
    ) -> Result<f64, DetectorError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(DetectorError::ThresholdOutOfRange { value });
        }
        let mut record = self.write(category)?;
        record.current = value.clamp(record.min, record.max);
        Ok(record.current)
    }

    /// Set the sensitivity multiplier for `category`.
    ///
    /// Fails if `value` is outside [0, 1].
    pub fn set_sensitivity(
        &self,
        category: SignalCategory,
        value: f64,
    ) -> Result<(), DetectorError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(DetectorError::SensitivityOutOfRange { value });
        }
        let mut record = self.write(category)?;
        record.sensitivity = value;
        Ok(())
    }

    /// Turn automatic adaptation on or off for every record.
    pub fn set_auto_adapt_all(&self, enabled: bool) {
        for category in SignalCategory::ALL {
            if let Ok(mut record) = self.write(category) {
                record.auto_adapt = enabled;
            }
        }
    }

    /// Apply one feedback-driven adaptation step to `category`.
    ///
    /// Moves the current threshold toward `feedback` by `adaptation_rate`
    /// of the gap, clamped to `[min, max]`, and increments the adaptation
    /// counter. Returns the new threshold.
    pub fn adapt(&self, category: SignalCategory, feedback: f64) -> Result<f64, DetectorError> {
        let mut record = self.write(category)?;
        let adjustment = (feedback - record.current) * record.adaptation_rate;
        record.current = (record.current + adjustment).clamp(record.min, record.max);
        record.adaptation_count += 1;
        Ok(record.current)
    }

    fn write(
        &self,
        category: SignalCategory,
    ) -> Result<std::sync::RwLockWriteGuard<'_, AdaptiveThreshold>, DetectorError> {
        self.records[category.index()]
            .write()
            .map_err(|_| DetectorError::LockPoisoned {
                component: "threshold record",
            })
    }
}
