//! Regression error metrics reported after evaluating a model.

use serde::Serialize;

/// Error metrics in price units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub mae: f64,
    pub rmse: f64,
    /// Mean absolute percentage error, `None` when every actual is zero.
    pub mape: Option<f64>,
    /// `100 - mape`.
    pub accuracy: Option<f64>,
    pub r2: f64,
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
}

impl EvaluationReport {
    /// Compute every metric over paired actual/predicted values.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        let mape = mape(actual, predicted);
        Self {
            samples: actual.len().min(predicted.len()),
            mae: mae(actual, predicted),
            rmse: rmse(actual, predicted),
            mape,
            accuracy: mape.map(|m| 100.0 - m),
            r2: r2(actual, predicted),
            evaluated_at: chrono::Utc::now(),
        }
    }
}

fn pairs<'a>(actual: &'a [f64], predicted: &'a [f64]) -> impl Iterator<Item = (f64, f64)> + 'a {
    actual.iter().copied().zip(predicted.iter().copied())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    mean(pairs(actual, predicted).map(|(a, p)| (a - p).abs()))
}

pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    mean(pairs(actual, predicted).map(|(a, p)| (a - p).powi(2)))
}

pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

/// Mean absolute percentage error, skipping zero actuals.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    let terms: Vec<f64> = pairs(actual, predicted)
        .filter(|(a, _)| *a != 0.0)
        .map(|(a, p)| ((a - p) / a).abs())
        .collect();
    if terms.is_empty() {
        return None;
    }
    Some(mean(terms.into_iter()) * 100.0)
}

/// Coefficient of determination.
pub fn r2(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    let actual_mean = mean(actual[..n].iter().copied());
    let ss_res: f64 = pairs(actual, predicted).map(|(a, p)| (a - p).powi(2)).sum();
    let ss_tot: f64 = actual[..n].iter().map(|a| (a - actual_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_perfect_prediction() {
        let values = [10.0, 20.0, 30.0];
        let report = EvaluationReport::compute(&values, &values);
        assert_eq!(report.samples, 3);
        assert!(approx(report.mae, 0.0));
        assert!(approx(report.rmse, 0.0));
        assert_eq!(report.mape, Some(0.0));
        assert_eq!(report.accuracy, Some(100.0));
        assert!(approx(report.r2, 1.0));
    }

    #[test]
    fn test_known_errors() {
        let actual = [100.0, 200.0, 300.0, 400.0];
        let predicted = [110.0, 190.0, 330.0, 400.0];

        assert!(approx(mae(&actual, &predicted), 12.5));
        assert!(approx(rmse(&actual, &predicted), (1100.0_f64 / 4.0).sqrt()));
        // (10% + 5% + 10% + 0%) / 4
        assert!(approx(mape(&actual, &predicted).unwrap(), 6.25));
        // ss_res = 1100, ss_tot = 50000
        assert!(approx(r2(&actual, &predicted), 1.0 - 1100.0 / 50000.0));
    }

    #[test]
    fn test_mape_skips_zero_actuals() {
        assert!(approx(mape(&[0.0, 50.0], &[5.0, 55.0]).unwrap(), 10.0));
        assert_eq!(mape(&[0.0, 0.0], &[1.0, 2.0]), None);
    }

    #[test]
    fn test_r2_constant_target() {
        assert_eq!(r2(&[5.0, 5.0], &[5.0, 5.0]), 1.0);
        assert_eq!(r2(&[5.0, 5.0], &[4.0, 6.0]), 0.0);
    }

    #[test]
    fn test_r2_can_be_negative() {
        assert!(r2(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) < 0.0);
    }
}
