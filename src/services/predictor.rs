//! Price prediction from a loaded model and scaler.

use crate::config::Config;
use crate::error::{ArtifactError, PredictError};
use crate::model::{fit_window, MinMaxScaler, SequenceModel};
use serde::Serialize;
use tracing::info;

/// Outcome of a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// Predicted next price, rounded to cents.
    pub price: f64,
    pub currency: String,
    /// Number of prices supplied by the caller.
    pub values_received: usize,
    /// Number of prices fed to the model (the window length).
    pub values_used: usize,
}

/// Model, scaler and currency label, loaded once and shared by all requests.
pub struct Predictor {
    model: SequenceModel,
    scaler: MinMaxScaler,
    currency: String,
}

impl Predictor {
    pub fn new(model: SequenceModel, scaler: MinMaxScaler, currency: impl Into<String>) -> Self {
        Self {
            model,
            scaler,
            currency: currency.into(),
        }
    }

    /// Load the artifacts named in the configuration.
    pub fn from_config(config: &Config) -> Result<Self, ArtifactError> {
        let model = SequenceModel::load(&config.model_path)?;
        let scaler = MinMaxScaler::load(&config.scaler_path)?;
        info!(
            "Loaded model from {} ({} lstm layers, window {}) and scaler from {}",
            config.model_path,
            model.num_layers(),
            model.window(),
            config.scaler_path
        );
        Ok(Self::new(model, scaler, config.currency.clone()))
    }

    pub fn window(&self) -> usize {
        self.model.window()
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Predict the price following `prices`.
    pub fn predict(&self, prices: &[f64]) -> Result<Forecast, PredictError> {
        if let Some(index) = prices.iter().position(|p| !p.is_finite()) {
            return Err(PredictError::InvalidValue { index });
        }
        let window = fit_window(prices, self.model.window()).ok_or(PredictError::EmptyInput)?;
        let scaled = self.scaler.transform_all(&window);
        let output = self
            .model
            .predict(&scaled)
            .map_err(|e| PredictError::Inference(e.to_string()))?;
        let price = self.scaler.inverse_transform(output);

        if !price.is_finite() {
            return Err(PredictError::Inference(format!(
                "model produced a non-finite value ({})",
                output
            )));
        }

        Ok(Forecast {
            price: round_cents(price),
            currency: self.currency.clone(),
            values_received: prices.len(),
            values_used: window.len(),
        })
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
