// Error types for the emergence detection engine
//
// Invalid input and poisoned locks are reported, never fatal: the boolean
// detection surface collapses them to `false`, while `try_detect` and the
// configuration calls expose them as typed errors with stable numeric codes.

use std::fmt;

use log::error;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages from
/// custom error types, enabling consistent error handling across embedding
/// boundaries.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Detector error code constants
///
/// Single source of truth for the numeric codes carried by [`DetectorError`].
///
/// Error code range: 2001-2004
pub struct DetectorErrorCodes {}

impl DetectorErrorCodes {
    /// Signal value is NaN or infinite
    pub const SIGNAL_NOT_FINITE: i32 = 2001;

    /// Threshold outside the valid [0, 1] range
    pub const THRESHOLD_OUT_OF_RANGE: i32 = 2002;

    /// Sensitivity outside the valid [0, 1] range
    pub const SENSITIVITY_OUT_OF_RANGE: i32 = 2003;

    /// Mutex/RwLock was poisoned
    pub const LOCK_POISONED: i32 = 2004;
}

/// Detection engine errors
///
/// These cover rejected input on the detection and configuration surfaces
/// plus poisoned-lock reporting. Below-threshold is not an error; it is a
/// legitimate `Ok(None)` outcome of `try_detect`.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorError {
    /// Signal value is NaN or infinite
    SignalNotFinite { value: f64 },

    /// Threshold outside the valid [0, 1] range
    ThresholdOutOfRange { value: f64 },

    /// Sensitivity outside the valid [0, 1] range
    SensitivityOutOfRange { value: f64 },

    /// Mutex/RwLock was poisoned
    LockPoisoned { component: &'static str },
}

impl ErrorCode for DetectorError {
    fn code(&self) -> i32 {
        match self {
            DetectorError::SignalNotFinite { .. } => DetectorErrorCodes::SIGNAL_NOT_FINITE,
            DetectorError::ThresholdOutOfRange { .. } => {
                DetectorErrorCodes::THRESHOLD_OUT_OF_RANGE
            }
            DetectorError::SensitivityOutOfRange { .. } => {
                DetectorErrorCodes::SENSITIVITY_OUT_OF_RANGE
            }
            DetectorError::LockPoisoned { .. } => DetectorErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            DetectorError::SignalNotFinite { value } => {
                format!("Signal value must be finite (got {})", value)
            }
            DetectorError::ThresholdOutOfRange { value } => {
                format!("Threshold must be within [0, 1] (got {})", value)
            }
            DetectorError::SensitivityOutOfRange { value } => {
                format!("Sensitivity must be within [0, 1] (got {})", value)
            }
            DetectorError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
        }
    }
}

impl fmt::Display for DetectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DetectorError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for DetectorError {}

/// Log a detector error with structured context
///
/// Logs the numeric code, the component, and the human-readable message.
/// Non-blocking, never panics.
pub fn log_detector_error(err: &DetectorError, context: &str) {
    error!(
        "Detector error in {}: code={}, component=EmergenceDetector, message={}",
        context,
        err.code(),
        err.message()
    );
}
