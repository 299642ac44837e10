//! Shaping price series into fixed-length model windows.

/// Coerce a price list to exactly `window` values.
///
/// Short lists are left-padded with their first value, long lists keep the
/// most recent `window` values. Returns `None` for an empty list.
pub fn fit_window(prices: &[f64], window: usize) -> Option<Vec<f64>> {
    let first = *prices.first()?;

    if prices.len() >= window {
        return Some(prices[prices.len() - window..].to_vec());
    }

    let mut fitted = vec![first; window - prices.len()];
    fitted.extend_from_slice(prices);
    Some(fitted)
}

/// Input windows paired with the value that follows each one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Samples {
    pub inputs: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl Samples {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Split at `index`, keeping order.
    pub fn split_at(mut self, index: usize) -> (Samples, Samples) {
        let index = index.min(self.len());
        let test = Samples {
            inputs: self.inputs.split_off(index),
            targets: self.targets.split_off(index),
        };
        (self, test)
    }
}

/// Build `(window, next value)` samples from a series.
///
/// Sample `i` covers `series[i..i + window]` with target `series[i + window]`,
/// for `i` in `0..len - window - 1`. The last complete window is left out, so
/// the sample count matches models fitted on the same convention.
pub fn sliding_windows(series: &[f64], window: usize) -> Samples {
    let count = series.len().saturating_sub(window + 1);

    let mut samples = Samples {
        inputs: Vec::with_capacity(count),
        targets: Vec::with_capacity(count),
    };
    for i in 0..count {
        samples.inputs.push(series[i..i + window].to_vec());
        samples.targets.push(series[i + window]);
    }
    samples
}

/// Number of leading samples assigned to training for a given ratio.
pub fn train_test_split(total: usize, train_ratio: f64) -> usize {
    let ratio = train_ratio.clamp(0.0, 1.0);
    ((total as f64) * ratio).floor() as usize
}
