use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned when a request carries an empty price list.
pub const MSG_EMPTY_LIST: &str = "Lista vazia";
/// Message returned when a price cannot be read as a finite number.
pub const MSG_INVALID_VALUES: &str = "Valores inválidos";
/// Message returned when the model fails to produce a prediction.
pub const MSG_PREDICTION_FAILED: &str = "Falha ao processar previsão";

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "erro": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Errors raised while reading model, scaler or price history files.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("invalid scaler: {0}")]
    InvalidScaler(String),

    #[error("invalid price history: {0}")]
    InvalidHistory(String),
}

/// Failures of a single prediction.
#[derive(Error, Debug, PartialEq)]
pub enum PredictError {
    #[error("empty price list")]
    EmptyInput,

    #[error("price at position {index} is not a finite number")]
    InvalidValue { index: usize },

    #[error("inference failed: {0}")]
    Inference(String),
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::EmptyInput => AppError::BadRequest(MSG_EMPTY_LIST.to_string()),
            PredictError::InvalidValue { .. } => {
                AppError::BadRequest(MSG_INVALID_VALUES.to_string())
            }
            PredictError::Inference(_) => AppError::Internal(MSG_PREDICTION_FAILED.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
