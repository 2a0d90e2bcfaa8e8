use rand::Rng;
use tracing::{debug, info};

use crate::metrics::{classify, error_rate};
use crate::{Dataset, Error, Network, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    /// Number of single-example updates.
    pub passes: usize,
    pub learning_rate: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            passes: 10_000,
            learning_rate: 0.05,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.passes == 0 {
            return Err(Error::InvalidConfig("passes must be > 0".to_owned()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub passes: usize,
    /// Mean `0.5 * ||output - target||²` over the training set after the last pass.
    pub final_loss: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalReport {
    /// First output unit of every sample, in dataset order.
    pub outputs: Vec<f64>,
    pub predictions: Vec<f64>,
    pub error_rate: f64,
}

impl Network {
    /// Online training: every pass draws one training sample uniformly at random
    /// (with replacement) and applies a single [`Network::adapt`] step.
    pub fn fit_online<R: Rng + ?Sized>(
        &mut self,
        train: &Dataset,
        cfg: &TrainConfig,
        rng: &mut R,
    ) -> Result<FitReport> {
        cfg.validate()?;
        self.check_dataset(train, "train")?;

        let mut trainer = self.trainer();
        let report_every = (cfg.passes / 10).max(1);
        for pass in 0..cfg.passes {
            let idx = rng.gen_range(0..train.len());
            self.adapt_with(&mut trainer, train.input(idx), train.target(idx), cfg.learning_rate)?;
            if (pass + 1) % report_every == 0 {
                debug!(pass = pass + 1, total = cfg.passes, "training progress");
            }
        }

        let final_loss = self.mean_loss(train)?;
        info!(passes = cfg.passes, final_loss, "finished online training");
        Ok(FitReport {
            passes: cfg.passes,
            final_loss,
        })
    }

    /// Thresholds the first output unit of every sample and compares it against
    /// the first target value.
    pub fn evaluate(&self, data: &Dataset) -> Result<EvalReport> {
        self.check_dataset(data, "evaluation")?;

        let mut record = self.record();
        let mut outputs = Vec::with_capacity(data.len());
        let mut labels = Vec::with_capacity(data.len());
        for (input, target) in data.iter() {
            let out = self.forward_into(input, &mut record)?;
            outputs.push(out[0]);
            labels.push(target[0]);
        }

        let predictions: Vec<f64> = outputs.iter().copied().map(classify).collect();
        let error_rate = error_rate(&predictions, &labels)?;
        info!(samples = data.len(), error_rate, "evaluated network");
        Ok(EvalReport {
            outputs,
            predictions,
            error_rate,
        })
    }

    fn mean_loss(&self, data: &Dataset) -> Result<f64> {
        let mut record = self.record();
        let mut total = 0.0;
        for (input, target) in data.iter() {
            let out = self.forward_into(input, &mut record)?;
            total += out
                .iter()
                .zip(target)
                .map(|(a, t)| 0.5 * (a - t) * (a - t))
                .sum::<f64>();
        }
        Ok(total / data.len() as f64)
    }

    fn check_dataset(&self, data: &Dataset, what: &str) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InvalidData(format!(
                "{what} dataset must not be empty"
            )));
        }
        if data.input_dim() != self.input_dim() {
            return Err(Error::InvalidData(format!(
                "{what} input_dim {} does not match network input_dim {}",
                data.input_dim(),
                self.input_dim()
            )));
        }
        if data.target_dim() != self.output_dim() {
            return Err(Error::InvalidData(format!(
                "{what} target_dim {} does not match network output_dim {}",
                data.target_dim(),
                self.output_dim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Activation;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn corners() -> Dataset {
        let xs = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
        Dataset::from_rows(&xs, &ys).unwrap()
    }

    #[test]
    fn train_config_validation() {
        assert!(TrainConfig::default().validate().is_ok());
        let bad = TrainConfig {
            passes: 0,
            ..TrainConfig::default()
        };
        assert!(bad.validate().is_err());
        let bad = TrainConfig {
            learning_rate: -0.1,
            ..TrainConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn fit_rejects_mismatched_dataset() {
        let mut net = Network::new_with_seed(&[3, 2, 1], Activation::Sigmoid, 1.0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let err = net
            .fit_online(&corners(), &TrainConfig::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn fit_lowers_training_loss() {
        let data = corners();
        let mut net = Network::new_with_seed(&[2, 4, 1], Activation::Sigmoid, 1.0, 2).unwrap();
        let before = net.mean_loss(&data).unwrap();

        let mut rng = StdRng::seed_from_u64(2);
        let cfg = TrainConfig {
            passes: 5_000,
            learning_rate: 0.5,
        };
        let report = net.fit_online(&data, &cfg, &mut rng).unwrap();
        assert_eq!(report.passes, 5_000);
        assert!(report.final_loss < before, "{} !< {before}", report.final_loss);
    }

    #[test]
    fn evaluate_reports_per_sample_predictions() {
        let net = Network::new_with_seed(&[2, 2, 1], Activation::Sigmoid, 1.0, 0).unwrap();
        let report = net.evaluate(&corners()).unwrap();
        assert_eq!(report.outputs.len(), 4);
        assert_eq!(report.predictions.len(), 4);
        assert!(report.predictions.iter().all(|&p| p == 0.0 || p == 1.0));
        assert!((0.0..=1.0).contains(&report.error_rate));
    }
}
