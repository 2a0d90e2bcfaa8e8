//! Metrics.
//!
//! Metrics are evaluation helpers (they do not participate in backprop).

use crate::{Error, Result};

/// Decision threshold for a single sigmoid-style output unit.
pub const CLASS_THRESHOLD: f64 = 0.5;

/// Maps a raw output to a class label: `1` above [`CLASS_THRESHOLD`], else `0`.
#[inline]
pub fn classify(output: f64) -> f64 {
    if output > CLASS_THRESHOLD { 1.0 } else { 0.0 }
}

/// Fraction of predictions that differ from their label.
pub fn error_rate(predictions: &[f64], labels: &[f64]) -> Result<f64> {
    if predictions.len() != labels.len() {
        return Err(Error::InvalidData(format!(
            "predictions/labels length mismatch: {} vs {}",
            predictions.len(),
            labels.len()
        )));
    }
    if predictions.is_empty() {
        return Err(Error::InvalidData(
            "cannot compute an error rate over zero samples".to_owned(),
        ));
    }

    let errors = predictions
        .iter()
        .zip(labels)
        .filter(|(p, l)| p != l)
        .count();
    Ok(errors as f64 / predictions.len() as f64)
}
