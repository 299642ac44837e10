//! Min/max feature scaler.

use crate::error::ArtifactError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Linear rescaling of a single feature into `feature_range`.
///
/// Fitted on the training closes and persisted next to the model, so that
/// requests are scaled exactly like the data the model learned from.
/// Values outside the fitted range are extrapolated, not clipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: f64,
    pub data_max: f64,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

impl MinMaxScaler {
    /// Build a scaler from explicit bounds.
    pub fn new(data_min: f64, data_max: f64) -> Result<Self, ArtifactError> {
        let scaler = Self {
            data_min,
            data_max,
            feature_range: default_feature_range(),
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Fit the bounds to a series.
    pub fn fit(values: &[f64]) -> Result<Self, ArtifactError> {
        if values.is_empty() {
            return Err(ArtifactError::InvalidScaler(
                "cannot fit on an empty series".to_string(),
            ));
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(ArtifactError::InvalidScaler(format!(
                "value at position {} is not finite",
                index
            )));
        }

        let data_min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let data_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self::new(data_min, data_max)
    }

    /// Load a persisted scaler.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let scaler: Self = super::read_json(path.as_ref())?;
        scaler.validate()?;
        Ok(scaler)
    }

    /// Persist the scaler as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        super::write_json(path.as_ref(), self)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        let (lo, hi) = self.feature_range;
        if ![self.data_min, self.data_max, lo, hi]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ArtifactError::InvalidScaler(
                "bounds must be finite".to_string(),
            ));
        }
        if self.data_min > self.data_max {
            return Err(ArtifactError::InvalidScaler(format!(
                "data_min {} exceeds data_max {}",
                self.data_min, self.data_max
            )));
        }
        if lo >= hi {
            return Err(ArtifactError::InvalidScaler(format!(
                "feature range ({}, {}) is empty",
                lo, hi
            )));
        }
        Ok(())
    }

    /// Multiplier from data units to feature units.
    fn scale(&self) -> f64 {
        let (lo, hi) = self.feature_range;
        let data_range = self.data_max - self.data_min;
        // A constant series divides by one
        let data_range = if data_range == 0.0 { 1.0 } else { data_range };
        (hi - lo) / data_range
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.data_min) * self.scale() + self.feature_range.0
    }

    pub fn inverse_transform(&self, value: f64) -> f64 {
        (value - self.feature_range.0) / self.scale() + self.data_min
    }

    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_fit_and_transform() {
        let scaler = MinMaxScaler::fit(&[10.0, 30.0, 20.0]).unwrap();
        assert_eq!(scaler.data_min, 10.0);
        assert_eq!(scaler.data_max, 30.0);

        assert!(approx(scaler.transform(10.0), 0.0));
        assert!(approx(scaler.transform(20.0), 0.5));
        assert!(approx(scaler.transform(30.0), 1.0));
    }

    #[test]
    fn test_inverse_transform() {
        let scaler = MinMaxScaler::new(100.0, 200.0).unwrap();
        assert!(approx(scaler.inverse_transform(0.25), 125.0));
        assert!(approx(scaler.inverse_transform(scaler.transform(173.5)), 173.5));
    }

    #[test]
    fn test_out_of_range_extrapolates() {
        let scaler = MinMaxScaler::new(0.0, 10.0).unwrap();
        assert!(approx(scaler.transform(20.0), 2.0));
        assert!(approx(scaler.transform(-5.0), -0.5));
    }

    #[test]
    fn test_constant_series() {
        let scaler = MinMaxScaler::fit(&[42.0, 42.0, 42.0]).unwrap();
        assert!(approx(scaler.transform(42.0), 0.0));
        assert!(approx(scaler.inverse_transform(0.0), 42.0));
        assert!(approx(scaler.transform(43.0), 1.0));
    }

    #[test]
    fn test_custom_feature_range() {
        let scaler = MinMaxScaler {
            data_min: 0.0,
            data_max: 4.0,
            feature_range: (-1.0, 1.0),
        };
        assert!(approx(scaler.transform(0.0), -1.0));
        assert!(approx(scaler.transform(2.0), 0.0));
        assert!(approx(scaler.inverse_transform(1.0), 4.0));
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        assert!(MinMaxScaler::fit(&[]).is_err());
        assert!(MinMaxScaler::fit(&[1.0, f64::NAN]).is_err());
        assert!(MinMaxScaler::new(5.0, 1.0).is_err());
    }

    #[test]
    fn test_load_defaults_feature_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        std::fs::write(&path, r#"{"data_min": 1.0, "data_max": 3.0}"#).unwrap();

        let scaler = MinMaxScaler::load(&path).unwrap();
        assert_eq!(scaler.feature_range, (0.0, 1.0));
        assert!(approx(scaler.transform(2.0), 0.5));
    }

    #[test]
    fn test_load_rejects_inverted_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        std::fs::write(&path, r#"{"data_min": 9.0, "data_max": 3.0}"#).unwrap();

        assert!(matches!(
            MinMaxScaler::load(&path),
            Err(ArtifactError::InvalidScaler(_))
        ));
    }
}
