//! Fully-connected layer.
//!
//! A layer maps `in_dim` activations to `out_dim` nets. The weights are a
//! row-major `(out_dim, in_dim)` matrix and the bias is a dedicated `out_dim`
//! vector, so the forward and backward math treat it as an additive term
//! instead of appending a constant `1` to every activation.
//!
//! The *augmented* view folds the bias back in as a trailing column, giving the
//! `(out_dim, in_dim + 1)` matrix shape used for bulk weight replacement and
//! for printing.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::Activation;

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    in_dim: usize,
    out_dim: usize,
    /// Row-major matrix with shape (out_dim, in_dim).
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl Layer {
    #[inline]
    pub fn new(in_dim: usize, out_dim: usize) -> Self {
        Self {
            in_dim,
            out_dim,
            weights: vec![0.0; in_dim * out_dim],
            biases: vec![0.0; out_dim],
        }
    }

    /// Fills every weight and bias with an independent draw from `dist`.
    ///
    /// Draws happen in augmented row-major order (each row's weights, then its
    /// bias) so a given RNG state always maps to the same augmented matrix.
    pub fn new_with_rng<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        dist: &Normal<f64>,
        rng: &mut R,
    ) -> Self {
        let mut layer = Self::new(in_dim, out_dim);
        for o in 0..out_dim {
            let row = o * in_dim;
            for w in &mut layer.weights[row..row + in_dim] {
                *w = dist.sample(rng);
            }
            layer.biases[o] = dist.sample(rng);
        }
        layer
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// Rows of the augmented matrix (`out_dim`).
    #[inline]
    pub fn rows(&self) -> usize {
        self.out_dim
    }

    /// Columns of the augmented matrix (`in_dim + 1`, the last one being the bias).
    #[inline]
    pub fn cols(&self) -> usize {
        self.in_dim + 1
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// Entry `(row, col)` of the augmented matrix; `col == in_dim` is the bias.
    ///
    /// Panics if `row >= rows()` or `col >= cols()`.
    #[inline]
    pub fn weight(&self, row: usize, col: usize) -> f64 {
        assert!(
            row < self.out_dim && col <= self.in_dim,
            "augmented index ({row}, {col}) out of bounds for ({}, {})",
            self.rows(),
            self.cols()
        );
        if col == self.in_dim {
            self.biases[row]
        } else {
            self.weights[row * self.in_dim + col]
        }
    }

    #[cfg(test)]
    pub(crate) fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    #[cfg(test)]
    pub(crate) fn biases_mut(&mut self) -> &mut [f64] {
        &mut self.biases
    }

    /// Row-major `(rows, cols)` copy with the bias as trailing column.
    pub fn augmented(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.rows() * self.cols());
        for o in 0..self.out_dim {
            let row = o * self.in_dim;
            out.extend_from_slice(&self.weights[row..row + self.in_dim]);
            out.push(self.biases[o]);
        }
        out
    }

    /// Overwrites weights and biases from an augmented row-major matrix.
    ///
    /// Shape contract: `flat.len() == self.rows() * self.cols()`.
    pub(crate) fn copy_from_augmented(&mut self, flat: &[f64]) {
        debug_assert_eq!(flat.len(), self.rows() * self.cols());

        let cols = self.cols();
        for (o, row) in flat.chunks_exact(cols).enumerate() {
            let start = o * self.in_dim;
            self.weights[start..start + self.in_dim].copy_from_slice(&row[..self.in_dim]);
            self.biases[o] = row[self.in_dim];
        }
    }

    /// Forward pass for a single sample.
    ///
    /// Computes `nets = W * inputs + b` and `outputs = activation(nets)`.
    ///
    /// Shape contract:
    /// - `inputs.len() == self.in_dim`
    /// - `nets.len() == outputs.len() == self.out_dim`
    #[inline]
    pub fn forward(
        &self,
        activation: Activation,
        inputs: &[f64],
        nets: &mut [f64],
        outputs: &mut [f64],
    ) {
        debug_assert_eq!(inputs.len(), self.in_dim);
        debug_assert_eq!(nets.len(), self.out_dim);
        debug_assert_eq!(outputs.len(), self.out_dim);

        for o in 0..self.out_dim {
            let mut sum = self.biases[o];
            let row = o * self.in_dim;
            for i in 0..self.in_dim {
                sum = self.weights[row + i].mul_add(inputs[i], sum);
            }
            nets[o] = sum;
            outputs[o] = activation.apply(sum);
        }
    }

    /// Propagates `delta` back through the current weights: `d_inputs = Wᵗ * delta`.
    ///
    /// The bias has no upstream unit, so it contributes nothing here.
    ///
    /// Shape contract:
    /// - `delta.len() == self.out_dim`
    /// - `d_inputs.len() == self.in_dim`
    #[inline]
    pub fn propagate_error(&self, delta: &[f64], d_inputs: &mut [f64]) {
        debug_assert_eq!(delta.len(), self.out_dim);
        debug_assert_eq!(d_inputs.len(), self.in_dim);

        d_inputs.fill(0.0);
        for o in 0..self.out_dim {
            let row = o * self.in_dim;
            for i in 0..self.in_dim {
                d_inputs[i] = self.weights[row + i].mul_add(delta[o], d_inputs[i]);
            }
        }
    }

    /// Gradient-descent step: `W -= lr * delta * inputsᵗ`, `b -= lr * delta`.
    ///
    /// Shape contract:
    /// - `inputs.len() == self.in_dim`
    /// - `delta.len() == self.out_dim`
    #[inline]
    pub fn apply_update(&mut self, inputs: &[f64], delta: &[f64], lr: f64) {
        debug_assert_eq!(inputs.len(), self.in_dim);
        debug_assert_eq!(delta.len(), self.out_dim);

        for o in 0..self.out_dim {
            let step = lr * delta[o];
            let row = o * self.in_dim;
            for i in 0..self.in_dim {
                self.weights[row + i] -= step * inputs[i];
            }
            self.biases[o] -= step;
        }
    }
}
