//! Loading persisted artifacts from disk and evaluating them on a CSV history.

use lstm_forecast::config::Config;
use lstm_forecast::history::load_closes;
use lstm_forecast::services::{evaluate, Predictor};
use lstm_forecast::{ArtifactError, MinMaxScaler, SequenceModel};
use std::path::Path;

/// Two 2-unit LSTM layers with zero weights and a dense head biased to 0.5.
const MODEL_JSON: &str = r#"{
  "window": 60,
  "layers": [
    {"type": "lstm", "units": 2,
     "kernel": [[0, 0, 0, 0, 0, 0, 0, 0]],
     "recurrent_kernel": [[0, 0, 0, 0, 0, 0, 0, 0], [0, 0, 0, 0, 0, 0, 0, 0]],
     "bias": [0, 0, 1, 1, 0, 0, 0, 0]},
    {"type": "lstm", "units": 2,
     "kernel": [[0, 0, 0, 0, 0, 0, 0, 0], [0, 0, 0, 0, 0, 0, 0, 0]],
     "recurrent_kernel": [[0, 0, 0, 0, 0, 0, 0, 0], [0, 0, 0, 0, 0, 0, 0, 0]],
     "bias": [0, 0, 0, 0, 0, 0, 0, 0]},
    {"type": "dense", "kernel": [[0], [0]], "bias": [0.5]}
  ]
}"#;

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.display().to_string()
}

#[test]
fn test_predictor_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        model_path: write(dir.path(), "model.json", MODEL_JSON),
        scaler_path: write(
            dir.path(),
            "scaler.json",
            r#"{"data_min": 80.0, "data_max": 120.0, "feature_range": [0.0, 1.0]}"#,
        ),
        currency: "EUR".to_string(),
        ..Config::default()
    };

    let predictor = Predictor::from_config(&config).unwrap();
    assert_eq!(predictor.window(), 60);

    let forecast = predictor.predict(&[95.0, 96.5, 97.0]).unwrap();
    assert_eq!(forecast.price, 100.0);
    assert_eq!(forecast.currency, "EUR");
    assert_eq!(forecast.values_used, 60);
}

#[test]
fn test_missing_model_file() {
    let config = Config {
        model_path: "/nonexistent/model.json".to_string(),
        ..Config::default()
    };
    assert!(matches!(
        Predictor::from_config(&config),
        Err(ArtifactError::Io { .. })
    ));
}

#[test]
fn test_malformed_model_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "model.json", "{\"window\": 60}");
    assert!(matches!(
        SequenceModel::load(&path),
        Err(ArtifactError::Json { .. })
    ));
}

#[test]
fn test_model_with_non_finite_weights() {
    let dir = tempfile::tempdir().unwrap();
    // Out-of-range weight
    let json = MODEL_JSON.replace("\"bias\": [0.5]", "\"bias\": [1e999]");
    let path = write(dir.path(), "model.json", &json);
    assert!(SequenceModel::load(&path).is_err());
}

#[test]
fn test_fit_scaler_then_evaluate() {
    let dir = tempfile::tempdir().unwrap();

    let mut csv = String::from("Date,Open,High,Low,Close,Volume\n");
    for day in 0..90 {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
            + chrono::Duration::days(day);
        csv.push_str(&format!("{},0,0,0,{},0\n", date.format("%Y-%m-%d"), 100.0 + day as f64));
    }
    let history = write(dir.path(), "prices.csv", &csv);

    let closes = load_closes(&history, "close").unwrap();
    assert_eq!(closes.len(), 90);

    let scaler = MinMaxScaler::fit(&closes).unwrap();
    let scaler_path = dir.path().join("out").join("scaler.json");
    scaler.save(&scaler_path).unwrap();
    let scaler = MinMaxScaler::load(&scaler_path).unwrap();
    assert_eq!(scaler.data_min, 100.0);
    assert_eq!(scaler.data_max, 189.0);

    let model = SequenceModel::load(write(dir.path(), "model.json", MODEL_JSON)).unwrap();
    let report = evaluate(&model, &scaler, &closes, 0.8).unwrap();

    // 90 - 60 - 1 = 29 windows, floor(29 * 0.8) = 23 train
    assert_eq!(report.samples, 6);
    assert!(report.rmse >= report.mae);
    assert!(report.mape.is_some());
}
