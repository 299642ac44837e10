//! Inference for a stacked LSTM regression model.
//!
//! Weights use the common `kernel` / `recurrent_kernel` / `bias` layout with
//! the four gates packed as `[input | forget | cell | output]`, each `units`
//! wide. The network reads one feature per time step and emits one value.

use crate::error::ArtifactError;
use ndarray::{s, Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Persisted form of a [`SequenceModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Number of time steps per input window.
    pub window: usize,
    pub layers: Vec<LayerSpec>,
}

/// A single layer as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerSpec {
    Lstm {
        units: usize,
        kernel: Vec<Vec<f64>>,
        recurrent_kernel: Vec<Vec<f64>>,
        bias: Vec<f64>,
    },
    Dense {
        kernel: Vec<Vec<f64>>,
        bias: Vec<f64>,
    },
}

/// One LSTM layer returning its full output sequence.
#[derive(Debug, Clone)]
pub struct LstmLayer {
    units: usize,
    /// [input_dim, 4 * units]
    kernel: Array2<f64>,
    /// [units, 4 * units]
    recurrent_kernel: Array2<f64>,
    /// [4 * units]
    bias: Array1<f64>,
}

impl LstmLayer {
    pub fn new(
        kernel: Array2<f64>,
        recurrent_kernel: Array2<f64>,
        bias: Array1<f64>,
    ) -> Result<Self, ArtifactError> {
        let units = recurrent_kernel.nrows();
        if units == 0 {
            return Err(ArtifactError::InvalidModel(
                "lstm layer has zero units".to_string(),
            ));
        }
        let gates = 4 * units;
        if recurrent_kernel.ncols() != gates {
            return Err(ArtifactError::InvalidModel(format!(
                "recurrent_kernel is {}x{}, expected {}x{}",
                recurrent_kernel.nrows(),
                recurrent_kernel.ncols(),
                units,
                gates
            )));
        }
        if kernel.ncols() != gates || kernel.nrows() == 0 {
            return Err(ArtifactError::InvalidModel(format!(
                "kernel is {}x{}, expected Nx{}",
                kernel.nrows(),
                kernel.ncols(),
                gates
            )));
        }
        if bias.len() != gates {
            return Err(ArtifactError::InvalidModel(format!(
                "bias has {} entries, expected {}",
                bias.len(),
                gates
            )));
        }

        Ok(Self {
            units,
            kernel,
            recurrent_kernel,
            bias,
        })
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn input_dim(&self) -> usize {
        self.kernel.nrows()
    }

    /// Advance the cell by one time step, returning `(h, c)`.
    fn step(
        &self,
        x: ArrayView1<f64>,
        h_prev: &Array1<f64>,
        c_prev: &Array1<f64>,
    ) -> (Array1<f64>, Array1<f64>) {
        let u = self.units;
        let z = x.dot(&self.kernel) + h_prev.dot(&self.recurrent_kernel) + &self.bias;

        let i_gate = z.slice(s![0..u]).mapv(sigmoid);
        let f_gate = z.slice(s![u..2 * u]).mapv(sigmoid);
        let g = z.slice(s![2 * u..3 * u]).mapv(f64::tanh);
        let o_gate = z.slice(s![3 * u..4 * u]).mapv(sigmoid);

        let c_next = &f_gate * c_prev + &i_gate * &g;
        let h_next = &o_gate * &c_next.mapv(f64::tanh);

        (h_next, c_next)
    }

    /// Run the layer over a `[steps, input_dim]` sequence, returning `[steps, units]`.
    pub fn forward(&self, inputs: &Array2<f64>) -> Array2<f64> {
        let steps = inputs.nrows();
        let mut outputs = Array2::zeros((steps, self.units));
        let mut h = Array1::zeros(self.units);
        let mut c = Array1::zeros(self.units);

        for (t, x) in inputs.outer_iter().enumerate() {
            let (h_next, c_next) = self.step(x, &h, &c);
            outputs.row_mut(t).assign(&h_next);
            h = h_next;
            c = c_next;
        }

        outputs
    }
}

/// Fully connected output layer with linear activation.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    /// [input_dim, output_dim]
    kernel: Array2<f64>,
    bias: Array1<f64>,
}

impl DenseLayer {
    pub fn new(kernel: Array2<f64>, bias: Array1<f64>) -> Result<Self, ArtifactError> {
        if kernel.nrows() == 0 || kernel.ncols() != bias.len() {
            return Err(ArtifactError::InvalidModel(format!(
                "dense kernel is {}x{} with {} biases",
                kernel.nrows(),
                kernel.ncols(),
                bias.len()
            )));
        }
        Ok(Self { kernel, bias })
    }

    pub fn forward(&self, x: ArrayView1<f64>) -> Array1<f64> {
        x.dot(&self.kernel) + &self.bias
    }
}

/// Stacked LSTM layers followed by a single-output dense head.
#[derive(Debug, Clone)]
pub struct SequenceModel {
    window: usize,
    layers: Vec<LstmLayer>,
    head: DenseLayer,
}

impl SequenceModel {
    pub fn new(
        window: usize,
        layers: Vec<LstmLayer>,
        head: DenseLayer,
    ) -> Result<Self, ArtifactError> {
        if window == 0 {
            return Err(ArtifactError::InvalidModel("window must be positive".to_string()));
        }
        let first = layers.first().ok_or_else(|| {
            ArtifactError::InvalidModel("model has no lstm layers".to_string())
        })?;
        if first.input_dim() != 1 {
            return Err(ArtifactError::InvalidModel(format!(
                "layer 0: kernel expects {} features per step, expected 1",
                first.input_dim()
            )));
        }
        for (idx, pair) in layers.windows(2).enumerate() {
            if pair[1].input_dim() != pair[0].units() {
                return Err(ArtifactError::InvalidModel(format!(
                    "layer {}: kernel expects {} inputs but layer {} has {} units",
                    idx + 1,
                    pair[1].input_dim(),
                    idx,
                    pair[0].units()
                )));
            }
        }
        let last_units = layers[layers.len() - 1].units();
        if head.kernel.nrows() != last_units || head.kernel.ncols() != 1 {
            // The dense head follows every lstm layer
            return Err(ArtifactError::InvalidModel(format!(
                "layer {}: kernel is {}x{}, expected {}x1",
                layers.len(),
                head.kernel.nrows(),
                head.kernel.ncols(),
                last_units
            )));
        }

        Ok(Self {
            window,
            layers,
            head,
        })
    }

    /// Load a model from its JSON artifact.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let artifact: ModelArtifact = super::read_json(path.as_ref())?;
        Self::try_from(artifact)
    }

    /// Persist the model as a JSON artifact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        super::write_json(path.as_ref(), &self.to_artifact())
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Predict the next scaled value from exactly `window` scaled inputs.
    pub fn predict(&self, inputs: &[f64]) -> Result<f64, ArtifactError> {
        if inputs.len() != self.window {
            return Err(ArtifactError::InvalidModel(format!(
                "expected {} input steps, got {}",
                self.window,
                inputs.len()
            )));
        }

        let mut sequence = Array2::from_shape_vec((inputs.len(), 1), inputs.to_vec())
            .map_err(|e| ArtifactError::InvalidModel(e.to_string()))?;
        for layer in &self.layers {
            sequence = layer.forward(&sequence);
        }

        let last = sequence.row(sequence.nrows() - 1);
        Ok(self.head.forward(last)[0])
    }

    pub fn to_artifact(&self) -> ModelArtifact {
        let mut layers: Vec<LayerSpec> = self
            .layers
            .iter()
            .map(|layer| LayerSpec::Lstm {
                units: layer.units,
                kernel: to_rows(&layer.kernel),
                recurrent_kernel: to_rows(&layer.recurrent_kernel),
                bias: layer.bias.to_vec(),
            })
            .collect();
        layers.push(LayerSpec::Dense {
            kernel: to_rows(&self.head.kernel),
            bias: self.head.bias.to_vec(),
        });

        ModelArtifact {
            window: self.window,
            layers,
        }
    }
}

impl TryFrom<ModelArtifact> for SequenceModel {
    type Error = ArtifactError;

    fn try_from(artifact: ModelArtifact) -> Result<Self, Self::Error> {
        let layer_count = artifact.layers.len();
        let mut lstm_layers = Vec::new();
        let mut head = None;

        for (idx, spec) in artifact.layers.into_iter().enumerate() {
            let context = |e: ArtifactError| match e {
                ArtifactError::InvalidModel(msg) => {
                    ArtifactError::InvalidModel(format!("layer {}: {}", idx, msg))
                }
                other => other,
            };

            match spec {
                LayerSpec::Lstm {
                    units,
                    kernel,
                    recurrent_kernel,
                    bias,
                } => {
                    if head.is_some() {
                        return Err(ArtifactError::InvalidModel(format!(
                            "layer {}: lstm layer after the dense head",
                            idx
                        )));
                    }
                    let layer = LstmLayer::new(
                        to_matrix("kernel", kernel).map_err(context)?,
                        to_matrix("recurrent_kernel", recurrent_kernel).map_err(context)?,
                        to_vector("bias", bias).map_err(context)?,
                    )
                    .map_err(context)?;
                    if layer.units() != units {
                        return Err(ArtifactError::InvalidModel(format!(
                            "layer {}: declares {} units but weights hold {}",
                            idx,
                            units,
                            layer.units()
                        )));
                    }
                    lstm_layers.push(layer);
                }
                LayerSpec::Dense { kernel, bias } => {
                    if idx + 1 != layer_count {
                        return Err(ArtifactError::InvalidModel(format!(
                            "layer {}: dense layer must be last",
                            idx
                        )));
                    }
                    head = Some(
                        DenseLayer::new(
                            to_matrix("kernel", kernel).map_err(context)?,
                            to_vector("bias", bias).map_err(context)?,
                        )
                        .map_err(context)?,
                    );
                }
            }
        }

        let head = head.ok_or_else(|| {
            ArtifactError::InvalidModel("model has no dense output layer".to_string())
        })?;
        Self::new(artifact.window, lstm_layers, head)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn to_matrix(name: &str, rows: Vec<Vec<f64>>) -> Result<Array2<f64>, ArtifactError> {
    let nrows = rows.len();
    let ncols = rows.first().map(Vec::len).unwrap_or(0);
    if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
        return Err(ArtifactError::InvalidModel(format!(
            "{} row {} has {} columns, expected {}",
            name,
            bad,
            rows[bad].len(),
            ncols
        )));
    }

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    if flat.iter().any(|v| !v.is_finite()) {
        return Err(ArtifactError::InvalidModel(format!(
            "{} contains non-finite weights",
            name
        )));
    }

    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| ArtifactError::InvalidModel(format!("{}: {}", name, e)))
}

fn to_vector(name: &str, values: Vec<f64>) -> Result<Array1<f64>, ArtifactError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ArtifactError::InvalidModel(format!(
            "{} contains non-finite weights",
            name
        )));
    }
    Ok(Array1::from(values))
}

fn to_rows(matrix: &Array2<f64>) -> Vec<Vec<f64>> {
    matrix.outer_iter().map(|row| row.to_vec()).collect()
}
