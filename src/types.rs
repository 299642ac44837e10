//! Wire types for the HTTP API.

use crate::services::Forecast;
use serde::{Deserialize, Serialize};

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub msg: String,
    pub version: String,
}

/// Successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(rename = "preco_previsto")]
    pub predicted_price: f64,
    #[serde(rename = "moeda")]
    pub currency: String,
    #[serde(rename = "valores_processados")]
    pub values_processed: usize,
}

impl From<Forecast> for PredictionResponse {
    fn from(forecast: Forecast) -> Self {
        Self {
            predicted_price: forecast.price,
            currency: forecast.currency,
            values_processed: forecast.values_used,
        }
    }
}
