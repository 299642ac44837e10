//! Prediction and evaluation services.

pub mod evaluation;
pub mod metrics;
pub mod predictor;

pub use evaluation::{evaluate, DEFAULT_TRAIN_RATIO};
pub use metrics::EvaluationReport;
pub use predictor::{Forecast, Predictor};
