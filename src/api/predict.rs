//! Prediction endpoint.
//!
//! `GET /prever?precos=10,20,30` or `POST /prever` with `{"precos": [...]}`.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::de::IgnoredAny;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{error, info, warn};

use crate::error::{AppError, PredictError, Result, MSG_INVALID_VALUES, MSG_PREDICTION_FAILED};
use crate::types::PredictionResponse;
use crate::AppState;

/// Usage hint for GET calls without prices.
pub const MSG_USAGE_QUERY: &str = "Use /prever?precos=10,20,30";
/// Usage hint for POST calls without a usable JSON body.
pub const MSG_USAGE_JSON: &str = "Envie JSON { 'precos': [...] }";

/// Create the prediction router.
pub fn router() -> Router<AppState> {
    Router::new().route("/prever", get(predict_from_query).post(predict_from_json))
}

async fn predict_from_query(
    State(state): State<AppState>,
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<PredictionResponse>> {
    info!("Request received on /prever");

    // First `precos` wins when the parameter is repeated
    let params = query.map(|Query(params)| params).unwrap_or_default();
    let raw = match params
        .iter()
        .find(|(key, _)| key == "precos")
        .map(|(_, value)| value.as_str())
        .filter(|s| !s.is_empty())
    {
        Some(raw) => raw,
        None => {
            warn!("Call without 'precos' parameter");
            return Err(AppError::BadRequest(MSG_USAGE_QUERY.to_string()));
        }
    };

    let prices = parse_price_list(raw).map_err(|e| {
        error!("Failed to convert received values: {}", e);
        AppError::BadRequest(MSG_INVALID_VALUES.to_string())
    })?;

    run_prediction(&state, prices).await
}

async fn predict_from_json(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionResponse>> {
    info!("Request received on /prever");

    let payload: Option<Value> = serde_json::from_slice(&body).ok();
    let precos = match payload
        .as_ref()
        .and_then(Value::as_object)
        .and_then(|obj| obj.get("precos"))
    {
        Some(precos) => precos,
        None if has_precos_key(&body) => {
            error!("Failed to convert received values: number out of range");
            return Err(AppError::BadRequest(MSG_INVALID_VALUES.to_string()));
        }
        None => {
            warn!("Invalid JSON received");
            return Err(AppError::BadRequest(MSG_USAGE_JSON.to_string()));
        }
    };

    let prices = json_price_list(precos).map_err(|e| {
        error!("Failed to convert received values: {}", e);
        AppError::BadRequest(MSG_INVALID_VALUES.to_string())
    })?;

    run_prediction(&state, prices).await
}

async fn run_prediction(state: &AppState, prices: Vec<f64>) -> Result<Json<PredictionResponse>> {
    let predictor = state.predictor.clone();
    let forecast = tokio::task::spawn_blocking(move || predictor.predict(&prices))
        .await
        .map_err(|e| {
            error!("Prediction task failed: {}", e);
            AppError::Internal(MSG_PREDICTION_FAILED.to_string())
        })?;

    match forecast {
        Ok(forecast) => {
            info!(
                "Values received: {} | Values used: {}",
                forecast.values_received, forecast.values_used
            );
            info!("Prediction generated: {:.2}", forecast.price);
            Ok(Json(forecast.into()))
        }
        Err(e) => {
            match &e {
                PredictError::EmptyInput => warn!("Empty list received"),
                PredictError::InvalidValue { .. } => warn!("Rejected prices: {}", e),
                PredictError::Inference(_) => error!("Prediction failed: {}", e),
            }
            Err(e.into())
        }
    }
}

/// Whether `body` is a JSON object with a `precos` key, without reading any numbers.
fn has_precos_key(body: &[u8]) -> bool {
    serde_json::from_slice::<HashMap<String, IgnoredAny>>(body)
        .map(|obj| obj.contains_key("precos"))
        .unwrap_or(false)
}

/// Parse `"10, 20.5,30"` into prices.
pub fn parse_price_list(raw: &str) -> std::result::Result<Vec<f64>, PredictError> {
    raw.split(',')
        .enumerate()
        .map(|(index, item)| {
            item.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or(PredictError::InvalidValue { index })
        })
        .collect()
}

/// Read a JSON array of numbers into prices.
pub fn json_price_list(value: &Value) -> std::result::Result<Vec<f64>, PredictError> {
    let items = value
        .as_array()
        .ok_or(PredictError::InvalidValue { index: 0 })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_f64()
                .filter(|v| v.is_finite())
                .ok_or(PredictError::InvalidValue { index })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_price_list() {
        assert_eq!(
            parse_price_list("10,20.5, 30 ").unwrap(),
            vec![10.0, 20.5, 30.0]
        );
        assert_eq!(parse_price_list("1e2").unwrap(), vec![100.0]);
    }

    #[test]
    fn test_parse_price_list_rejects_garbage() {
        assert_eq!(
            parse_price_list("10,abc,30"),
            Err(PredictError::InvalidValue { index: 1 })
        );
        assert_eq!(
            parse_price_list("10,,30"),
            Err(PredictError::InvalidValue { index: 1 })
        );
        assert!(parse_price_list("10,NaN").is_err());
        assert!(parse_price_list("inf").is_err());
    }

    #[test]
    fn test_has_precos_key() {
        assert!(has_precos_key(br#"{"precos": [10, 1e400]}"#));
        assert!(!has_precos_key(br#"{"prices": [10, 1e400]}"#));
        assert!(!has_precos_key(br#"[1e400]"#));
        assert!(!has_precos_key(b"not json"));
    }

    #[test]
    fn test_json_price_list() {
        assert_eq!(
            json_price_list(&json!([1, 2.5, 3])).unwrap(),
            vec![1.0, 2.5, 3.0]
        );
        assert!(json_price_list(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_json_price_list_rejects_non_numbers() {
        assert!(json_price_list(&json!("10,20")).is_err());
        assert!(json_price_list(&json!(null)).is_err());
        assert_eq!(
            json_price_list(&json!([1, "2", 3])),
            Err(PredictError::InvalidValue { index: 1 })
        );
    }
}
