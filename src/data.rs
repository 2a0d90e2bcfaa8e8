//! Contiguous dataset helpers and the noisy XOR generator.
//!
//! `Dataset` stores samples row-major so the training loop can hand out input
//! and target slices without per-step allocations.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{Error, Result};

/// A supervised dataset: inputs (X) and targets (Y).
///
/// Stored as contiguous buffers with row-major layout:
/// - `inputs.len() == len * input_dim`
/// - `targets.len() == len * target_dim`
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Vec<f64>,
    targets: Vec<f64>,
    len: usize,
    input_dim: usize,
    target_dim: usize,
}

impl Dataset {
    /// Build a dataset from flat buffers.
    ///
    /// `inputs` is `(len, input_dim)` and `targets` is `(len, target_dim)`.
    pub fn from_flat(
        inputs: Vec<f64>,
        targets: Vec<f64>,
        input_dim: usize,
        target_dim: usize,
    ) -> Result<Self> {
        if input_dim == 0 || target_dim == 0 {
            return Err(Error::InvalidData(
                "input_dim and target_dim must be > 0".to_owned(),
            ));
        }
        if inputs.len() % input_dim != 0 {
            return Err(Error::InvalidData(format!(
                "inputs length {} is not divisible by input_dim {input_dim}",
                inputs.len()
            )));
        }

        let len = inputs.len() / input_dim;
        if targets.len() != len * target_dim {
            return Err(Error::InvalidData(format!(
                "targets length {} does not match len * target_dim ({len} * {target_dim})",
                targets.len()
            )));
        }

        Ok(Self {
            inputs,
            targets,
            len,
            input_dim,
            target_dim,
        })
    }

    /// Build a dataset from per-sample rows.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_rows(inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::InvalidData(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.len(),
                targets.len()
            )));
        }
        if inputs.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }

        let input_dim = inputs[0].len();
        let target_dim = targets[0].len();
        for (i, (x, y)) in inputs.iter().zip(targets).enumerate() {
            if x.len() != input_dim {
                return Err(Error::InvalidData(format!(
                    "input row {i} has len {}, expected {input_dim}",
                    x.len()
                )));
            }
            if y.len() != target_dim {
                return Err(Error::InvalidData(format!(
                    "target row {i} has len {}, expected {target_dim}",
                    y.len()
                )));
            }
        }

        Self::from_flat(inputs.concat(), targets.concat(), input_dim, target_dim)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    /// Returns the `idx`-th input row.
    ///
    /// Panics if `idx >= len`.
    #[inline]
    pub fn input(&self, idx: usize) -> &[f64] {
        let start = idx * self.input_dim;
        &self.inputs[start..start + self.input_dim]
    }

    /// Returns the `idx`-th target row.
    ///
    /// Panics if `idx >= len`.
    #[inline]
    pub fn target(&self, idx: usize) -> &[f64] {
        let start = idx * self.target_dim;
        &self.targets[start..start + self.target_dim]
    }

    /// Iterates over `(input, target)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], &[f64])> + '_ {
        (0..self.len).map(move |idx| (self.input(idx), self.target(idx)))
    }

    /// Splits into `(train, test)`: the first `floor(len * percentage / 100)`
    /// samples train, the rest test. No shuffling happens here.
    pub fn split(&self, train_percentage: u8) -> Result<(Dataset, Dataset)> {
        if train_percentage > 100 {
            return Err(Error::InvalidConfig(format!(
                "train percentage must be within [0, 100], got {train_percentage}"
            )));
        }
        let cut = self.len * usize::from(train_percentage) / 100;
        Ok((self.slice(0, cut), self.slice(cut, self.len)))
    }

    fn slice(&self, start: usize, end: usize) -> Dataset {
        Dataset {
            inputs: self.inputs[start * self.input_dim..end * self.input_dim].to_vec(),
            targets: self.targets[start * self.target_dim..end * self.target_dim].to_vec(),
            len: end - start,
            input_dim: self.input_dim,
            target_dim: self.target_dim,
        }
    }
}

/// Settings for the noisy XOR generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XorConfig {
    /// Number of points to generate.
    pub size: usize,
    /// Standard deviation of the Gaussian noise added to each coordinate.
    pub std_dev: f64,
}

impl Default for XorConfig {
    fn default() -> Self {
        Self {
            size: 80,
            std_dev: 0.1,
        }
    }
}

impl XorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::InvalidConfig("XOR data size must be > 0".to_owned()));
        }
        if !(self.std_dev.is_finite() && self.std_dev >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "XOR noise std deviation must be finite and >= 0, got {}",
                self.std_dev
            )));
        }
        Ok(())
    }
}

const XOR_CORNERS: [[f64; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];

/// Generates 2-D XOR points cycling through the unit square's corners with
/// Gaussian noise on both coordinates.
///
/// Labels are computed from the noisy point, so a corner pushed across the
/// `0.5` line changes class.
pub fn generate_xor<R: Rng + ?Sized>(cfg: &XorConfig, rng: &mut R) -> Result<Dataset> {
    cfg.validate()?;
    let noise = Normal::new(0.0, cfg.std_dev)
        .map_err(|e| Error::InvalidConfig(format!("XOR noise: {e}")))?;

    let mut inputs = Vec::with_capacity(cfg.size * 2);
    let mut targets = Vec::with_capacity(cfg.size);
    for i in 0..cfg.size {
        let [x, y] = XOR_CORNERS[i % 4];
        let point = [x + noise.sample(rng), y + noise.sample(rng)];
        targets.push(xor_label(point));
        inputs.extend_from_slice(&point);
    }

    Dataset::from_flat(inputs, targets, 2, 1)
}

/// `1` iff exactly one coordinate is above `0.5`.
#[inline]
pub fn xor_label(point: [f64; 2]) -> f64 {
    if (point[0] > 0.5) != (point[1] > 0.5) {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn dataset_from_flat_validates_shapes() {
        let ok = Dataset::from_flat(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0], 2, 1);
        assert!(ok.is_ok());

        let err = Dataset::from_flat(vec![0.0, 1.0, 2.0], vec![0.0], 2, 1);
        assert!(err.is_err());

        let err = Dataset::from_flat(vec![0.0, 1.0], vec![0.0, 1.0], 2, 1);
        assert!(err.is_err());
    }

    #[test]
    fn dataset_from_rows_rejects_ragged_rows() {
        let xs = vec![vec![0.0, 0.0], vec![1.0]];
        let ys = vec![vec![0.0], vec![1.0]];
        assert!(Dataset::from_rows(&xs, &ys).is_err());
    }

    #[test]
    fn split_keeps_order_and_floor_cut() {
        let xs: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let ys: Vec<Vec<f64>> = (0..10).map(|i| vec![(i % 2) as f64]).collect();
        let data = Dataset::from_rows(&xs, &ys).unwrap();

        let (train, test) = data.split(75).unwrap();
        assert_eq!(train.len(), 7);
        assert_eq!(test.len(), 3);
        assert_eq!(test.input(0), &[7.0]);
        assert_eq!(test.target(0), &[1.0]);

        let (train, test) = data.split(100).unwrap();
        assert_eq!((train.len(), test.len()), (10, 0));
        assert!(data.split(101).is_err());
    }

    #[test]
    fn xor_labels() {
        assert_eq!(xor_label([0.0, 0.0]), 0.0);
        assert_eq!(xor_label([0.0, 1.0]), 1.0);
        assert_eq!(xor_label([1.0, 0.0]), 1.0);
        assert_eq!(xor_label([1.0, 1.0]), 0.0);
        assert_eq!(xor_label([0.5, 0.51]), 1.0);
    }

    #[test]
    fn noiseless_xor_cycles_corners() {
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = XorConfig {
            size: 8,
            std_dev: 0.0,
        };
        let data = generate_xor(&cfg, &mut rng).unwrap();
        assert_eq!(data.len(), 8);
        assert_eq!(data.input(5), &[0.0, 1.0]);
        let labels: Vec<f64> = data.iter().map(|(_, y)| y[0]).collect();
        assert_eq!(labels, vec![0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn noisy_xor_labels_follow_points() {
        let mut rng = StdRng::seed_from_u64(42);
        let cfg = XorConfig {
            size: 200,
            std_dev: 0.3,
        };
        let data = generate_xor(&cfg, &mut rng).unwrap();
        for (x, y) in data.iter() {
            assert_eq!(y[0], xor_label([x[0], x[1]]));
        }
    }

    #[test]
    fn xor_config_validation() {
        assert!(XorConfig::default().validate().is_ok());
        let bad = XorConfig {
            size: 0,
            ..XorConfig::default()
        };
        assert!(bad.validate().is_err());
        let bad = XorConfig {
            std_dev: -1.0,
            ..XorConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
