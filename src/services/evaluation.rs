//! Hold-out evaluation of a persisted model against a price history.

use super::metrics::EvaluationReport;
use crate::error::ArtifactError;
use crate::model::{sliding_windows, train_test_split, MinMaxScaler, SequenceModel};
use tracing::{debug, info};

/// Fraction of samples treated as training data when none is given.
pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;

/// Score `model` on the trailing test split of `closes`.
///
/// Closes are scaled with the persisted scaler, never refitted, so the
/// numbers reflect what the server would predict.
pub fn evaluate(
    model: &SequenceModel,
    scaler: &MinMaxScaler,
    closes: &[f64],
    train_ratio: f64,
) -> Result<EvaluationReport, ArtifactError> {
    let scaled = scaler.transform_all(closes);
    let samples = sliding_windows(&scaled, model.window());
    let split = train_test_split(samples.len(), train_ratio);
    let (train, test) = samples.split_at(split);

    info!(
        "Built {} windows of {} steps ({} train, {} test)",
        train.len() + test.len(),
        model.window(),
        train.len(),
        test.len()
    );

    if test.is_empty() {
        return Err(ArtifactError::InvalidHistory(format!(
            "no test windows: {} closes with window {} and train ratio {}",
            closes.len(),
            model.window(),
            train_ratio
        )));
    }

    let mut predicted = Vec::with_capacity(test.len());
    for input in &test.inputs {
        let output = model.predict(input)?;
        predicted.push(scaler.inverse_transform(output));
    }
    let actual: Vec<f64> = test
        .targets
        .iter()
        .map(|&t| scaler.inverse_transform(t))
        .collect();

    debug!("Predicted {} test windows", predicted.len());
    Ok(EvaluationReport::compute(&actual, &predicted))
}
