//! Linear rescaling of raw range samples.
//!
//! A [`Calibration`] holds the sensor's working range. Samples inside the
//! range map onto `[0, 1]`; samples outside it are not clamped and land
//! outside that interval.
//!
//! # Example
//! ```rust
//! use airc_core::utils::math::normalize::{Calibration, SensorReading};
//! let cal = Calibration::new(0, 1000).unwrap();
//! let input = cal.normalize_reading(SensorReading::new(0, 500, 1000));
//! assert_eq!(input.to_array(), [0.0, 0.5, 1.0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::utils::error::ConfigError;

/// Lower bound of the default working range (10-bit analog range sensor).
pub const DEFAULT_MIN_VALUE: u16 = 0;
/// Upper bound of the default working range (10-bit analog range sensor).
pub const DEFAULT_MAX_VALUE: u16 = 1023;

/// Number of beams in one sensor reading.
pub const BEAMS: usize = 3;

/// One reading from the three-beam range sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorReading {
    pub left: u16,
    pub center: u16,
    pub right: u16,
}

impl SensorReading {
    pub const fn new(
        left: u16,
        center: u16,
        right: u16,
    ) -> Self {
        Self {
            left,
            center,
            right,
        }
    }

    pub const fn to_array(self) -> [u16; BEAMS] {
        [self.left, self.center, self.right]
    }
}

impl From<[u16; BEAMS]> for SensorReading {
    fn from([left, center, right]: [u16; BEAMS]) -> Self {
        Self::new(left, center, right)
    }
}

/// A reading rescaled for the model, in beam order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedInput {
    pub left: f32,
    pub center: f32,
    pub right: f32,
}

impl NormalizedInput {
    pub const fn to_array(self) -> [f32; BEAMS] {
        [self.left, self.center, self.right]
    }
}

/// Sensor working range used for normalization.
///
/// `min_value < max_value` always holds; both [`Calibration::new`] and
/// deserialization reject anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCalibration")]
pub struct Calibration {
    min_value: u16,
    max_value: u16,
}

#[derive(Deserialize)]
struct RawCalibration {
    min_value: u16,
    max_value: u16,
}

impl TryFrom<RawCalibration> for Calibration {
    type Error = ConfigError;

    fn try_from(raw: RawCalibration) -> Result<Self, Self::Error> {
        Calibration::new(raw.min_value, raw.max_value)
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            min_value: DEFAULT_MIN_VALUE,
            max_value: DEFAULT_MAX_VALUE,
        }
    }
}

impl Calibration {
    pub fn new(
        min_value: u16,
        max_value: u16,
    ) -> Result<Self, ConfigError> {
        if min_value >= max_value {
            return Err(ConfigError::InvalidCalibration {
                min: min_value,
                max: max_value,
            });
        }
        Ok(Self {
            min_value,
            max_value,
        })
    }

    pub fn min_value(&self) -> u16 {
        self.min_value
    }

    pub fn max_value(&self) -> u16 {
        self.max_value
    }

    /// `(raw - min) / (max - min)`, unclamped.
    pub fn normalize(
        &self,
        raw: u16,
    ) -> f32 {
        let min = self.min_value as f32;
        (raw as f32 - min) / (self.max_value as f32 - min)
    }

    pub fn normalize_reading(
        &self,
        reading: SensorReading,
    ) -> NormalizedInput {
        NormalizedInput {
            left: self.normalize(reading.left),
            center: self.normalize(reading.center),
            right: self.normalize(reading.right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_map_to_unit_interval_ends() {
        let cal = Calibration::new(100, 900).unwrap();
        assert_eq!(cal.normalize(100), 0.0);
        assert_eq!(cal.normalize(900), 1.0);
    }

    #[test]
    fn in_range_samples_stay_in_unit_interval() {
        let cal = Calibration::new(37, 1001).unwrap();
        for raw in 37..=1001u16 {
            let v = cal.normalize(raw);
            assert!((0.0..=1.0).contains(&v), "raw {} -> {}", raw, v);
        }
    }

    #[test]
    fn min_min_max_reading() {
        let cal = Calibration::default();
        let input = cal.normalize_reading(SensorReading::new(
            DEFAULT_MIN_VALUE,
            DEFAULT_MIN_VALUE,
            DEFAULT_MAX_VALUE,
        ));
        assert_eq!(input.to_array(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn out_of_range_is_not_clamped() {
        let cal = Calibration::new(100, 200).unwrap();
        assert!((cal.normalize(50) + 0.5).abs() < 1e-6);
        assert!((cal.normalize(300) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_empty_or_inverted_range() {
        assert_eq!(
            Calibration::new(5, 5),
            Err(ConfigError::InvalidCalibration { min: 5, max: 5 })
        );
        assert!(Calibration::new(10, 3).is_err());
    }
}
