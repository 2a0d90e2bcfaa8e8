use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use tracing::{debug, trace};

use crate::{Activation, Error, Layer, Result};

/// A fully-connected feed-forward network.
///
/// The network exclusively owns its layers; they are addressed by index and any
/// borrowed view is invalidated by the next [`Network::adapt`].
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    input_dim: usize,
    hidden_dims: Vec<usize>,
    output_dim: usize,
    activation: Activation,
    layers: Vec<Layer>,
}

/// Per-layer trace of one forward pass.
///
/// `activations[i]` and `nets[i]` both have the width of layer `i`'s output; the
/// input itself is not part of the record.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationRecord {
    activations: Vec<Vec<f64>>,
    nets: Vec<Vec<f64>>,
}

/// Reusable buffers for [`Network::adapt_with`].
#[derive(Debug, Clone)]
pub struct Trainer {
    record: ActivationRecord,
    // One error term per layer output, filled from the last layer backwards.
    deltas: Vec<Vec<f64>>,
}

impl Network {
    /// Builds a network with weights drawn from an entropy-seeded RNG.
    pub fn new(dims: &[usize], activation: Activation, variance: f64) -> Result<Self> {
        let mut rng = StdRng::from_entropy();
        Self::new_with_rng(dims, activation, variance, &mut rng)
    }

    pub fn new_with_seed(
        dims: &[usize],
        activation: Activation,
        variance: f64,
        seed: u64,
    ) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(dims, activation, variance, &mut rng)
    }

    /// Builds a network whose weights and biases are independent `N(0, variance)` draws.
    ///
    /// `dims` lists the input width, one or more hidden widths and the output
    /// width, so it needs at least three entries.
    pub fn new_with_rng<R: Rng + ?Sized>(
        dims: &[usize],
        activation: Activation,
        variance: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if dims.len() < 3 {
            return Err(Error::InvalidTopology(format!(
                "need at least 3 layer widths (input, hidden, output), got {}",
                dims.len()
            )));
        }
        if dims.contains(&0) {
            return Err(Error::InvalidTopology(format!(
                "all layer widths must be > 0, got {dims:?}"
            )));
        }
        if !(variance.is_finite() && variance >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "weight variance must be finite and >= 0, got {variance}"
            )));
        }

        let dist = Normal::new(0.0, variance.sqrt())
            .map_err(|e| Error::InvalidConfig(format!("weight distribution: {e}")))?;

        let mut layers = Vec::with_capacity(dims.len() - 1);
        for w in dims.windows(2) {
            layers.push(Layer::new_with_rng(w[0], w[1], &dist, rng));
        }

        debug!(?dims, %activation, variance, layers = layers.len(), "built network");

        Ok(Self {
            input_dim: dims[0],
            hidden_dims: dims[1..dims.len() - 1].to_vec(),
            output_dim: dims[dims.len() - 1],
            activation,
            layers,
        })
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    pub fn hidden_dims(&self) -> &[usize] {
        &self.hidden_dims
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn layer(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx)
    }

    pub fn record(&self) -> ActivationRecord {
        ActivationRecord::new(self)
    }

    pub fn trainer(&self) -> Trainer {
        Trainer::new(self)
    }

    /// Replaces every layer's weights from augmented row-major matrices.
    ///
    /// Entry `i` must hold `rows * cols` values for layer `i`, with the bias in
    /// the trailing column. All entries are checked before anything is written,
    /// so on error the network is left untouched.
    pub fn set_weights<W: AsRef<[f64]>>(&mut self, per_layer: &[W]) -> Result<()> {
        if per_layer.len() != self.layers.len() {
            return Err(Error::ShapeMismatch(format!(
                "got weights for {} layers, network has {}",
                per_layer.len(),
                self.layers.len()
            )));
        }
        for (idx, (layer, flat)) in self.layers.iter().zip(per_layer).enumerate() {
            let flat = flat.as_ref();
            if flat.len() != layer.rows() * layer.cols() {
                return Err(Error::ShapeMismatch(format!(
                    "layer {idx} is {}x{} ({} values), got {} values",
                    layer.rows(),
                    layer.cols(),
                    layer.rows() * layer.cols(),
                    flat.len()
                )));
            }
        }

        for (layer, flat) in self.layers.iter_mut().zip(per_layer) {
            layer.copy_from_augmented(flat.as_ref());
        }
        debug!(layers = self.layers.len(), "replaced network weights");
        Ok(())
    }

    /// Forward pass for a single sample, allocating a fresh record.
    pub fn forward(&self, input: &[f64]) -> Result<ActivationRecord> {
        let mut record = self.record();
        self.forward_into(input, &mut record)?;
        Ok(record)
    }

    /// Forward pass for a single sample.
    ///
    /// Writes every layer's nets and activations into `record` and returns the
    /// final output slice. Weights are only read.
    pub fn forward_into<'a>(
        &self,
        input: &[f64],
        record: &'a mut ActivationRecord,
    ) -> Result<&'a [f64]> {
        check_len("input", self.input_dim, input.len())?;
        self.check_record(record)?;

        for (idx, layer) in self.layers.iter().enumerate() {
            // Borrow the previous activation immutably and the current one mutably.
            let (done, rest) = record.activations.split_at_mut(idx);
            let layer_input: &[f64] = if idx == 0 { input } else { &done[idx - 1] };
            layer.forward(
                self.activation,
                layer_input,
                &mut record.nets[idx],
                &mut rest[0],
            );
        }

        Ok(record.output())
    }

    /// One online gradient-descent step on a single example.
    pub fn adapt(&mut self, input: &[f64], target: &[f64], learning_rate: f64) -> Result<()> {
        let mut trainer = self.trainer();
        self.adapt_with(&mut trainer, input, target, learning_rate)
    }

    /// One online gradient-descent step on a single example, reusing `trainer`.
    ///
    /// Minimizes `0.5 * ||output - target||²`. Deltas are computed from the
    /// output layer backwards; each layer's error is propagated to the layer
    /// below through its weights *before* those weights are updated.
    pub fn adapt_with(
        &mut self,
        trainer: &mut Trainer,
        input: &[f64],
        target: &[f64],
        learning_rate: f64,
    ) -> Result<()> {
        check_len("input", self.input_dim, input.len())?;
        check_len("target", self.output_dim, target.len())?;
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite and > 0, got {learning_rate}"
            )));
        }
        let deltas_match = trainer.deltas.len() == self.layers.len()
            && trainer
                .deltas
                .iter()
                .zip(&self.layers)
                .all(|(d, layer)| d.len() == layer.out_dim());
        if !deltas_match {
            return Err(Error::ShapeMismatch(
                "trainer was built for a different network".to_owned(),
            ));
        }

        self.forward_into(input, &mut trainer.record)?;

        let act = self.activation;
        let last = self.layers.len() - 1;
        let output = &trainer.record.activations[last];

        let mut error = 0.0;
        for ((d, &a), &t) in trainer.deltas[last].iter_mut().zip(output).zip(target) {
            let diff = a - t;
            error += diff * diff;
            *d = diff * act.derivative_from_output(a);
        }

        for idx in (0..self.layers.len()).rev() {
            let layer_input: &[f64] = if idx == 0 {
                input
            } else {
                &trainer.record.activations[idx - 1]
            };

            if idx > 0 {
                let (below, current) = trainer.deltas.split_at_mut(idx);
                let prev = &mut below[idx - 1];
                self.layers[idx].propagate_error(&current[0], prev);
                for (d, &a) in prev.iter_mut().zip(layer_input) {
                    *d *= act.derivative_from_output(a);
                }
            }

            self.layers[idx].apply_update(layer_input, &trainer.deltas[idx], learning_rate);
        }

        trace!(error = 0.5 * error, learning_rate, "adapted network");
        Ok(())
    }

    /// Human-readable dump of the dimensions and weight matrices.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    fn check_record(&self, record: &ActivationRecord) -> Result<()> {
        let matches = record.activations.len() == self.layers.len()
            && record.nets.len() == self.layers.len()
            && self.layers.iter().enumerate().all(|(idx, layer)| {
                record.activations[idx].len() == layer.out_dim()
                    && record.nets[idx].len() == layer.out_dim()
            });
        if !matches {
            return Err(Error::ShapeMismatch(
                "activation record was built for a different network".to_owned(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MLP Description:")?;
        writeln!(
            f,
            "\tDimensions       -> {} / {:?} / {}",
            self.input_dim, self.hidden_dims, self.output_dim
        )?;
        writeln!(f, "\tActivation       -> {}", self.activation)?;
        for (idx, layer) in self.layers.iter().enumerate() {
            write!(f, "\tWeight Matrix {idx:>2} -> [")?;
            for (row, values) in layer.augmented().chunks_exact(layer.cols()).enumerate() {
                if row > 0 {
                    f.write_str("; ")?;
                }
                for (col, v) in values.iter().enumerate() {
                    if col > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{v}")?;
                }
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

impl ActivationRecord {
    pub fn new(network: &Network) -> Self {
        let widths = network.layers.iter().map(Layer::out_dim);
        Self {
            activations: widths.clone().map(|w| vec![0.0; w]).collect(),
            nets: widths.map(|w| vec![0.0; w]).collect(),
        }
    }

    /// Activation of the last layer.
    #[inline]
    pub fn output(&self) -> &[f64] {
        self.activations.last().map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn activations(&self) -> &[Vec<f64>] {
        &self.activations
    }

    #[inline]
    pub fn nets(&self) -> &[Vec<f64>] {
        &self.nets
    }

    /// Splits the record into `(output, activations, nets)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<Vec<f64>>, Vec<Vec<f64>>) {
        (self.output().to_vec(), self.activations, self.nets)
    }
}

impl Trainer {
    pub fn new(network: &Network) -> Self {
        Self {
            record: ActivationRecord::new(network),
            deltas: network
                .layers
                .iter()
                .map(|layer| vec![0.0; layer.out_dim()])
                .collect(),
        }
    }

    /// Trace of the forward pass run by the most recent adapt step.
    #[inline]
    pub fn record(&self) -> &ActivationRecord {
        &self.record
    }
}

#[inline]
fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::DimensionMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
