//! A single sensor sample.

use crate::types::Timestamp;

/// One sampled value of the monitored metric, or its absence.
///
/// Non-finite values are folded into "unavailable" on construction so a
/// broken sensor can never look like a definite normal reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    value: Option<f64>,
    taken_at: Timestamp,
}

impl Reading {
    pub fn new(value: f64, taken_at: Timestamp) -> Self {
        Self {
            value: value.is_finite().then_some(value),
            taken_at,
        }
    }

    pub fn unavailable(taken_at: Timestamp) -> Self {
        Self {
            value: None,
            taken_at,
        }
    }

    /// The sampled value, `None` when the sensor could not be read.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn taken_at(&self) -> Timestamp {
        self.taken_at
    }

    pub fn is_available(&self) -> bool {
        self.value.is_some()
    }
}
