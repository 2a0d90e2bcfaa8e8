//! Activation functions.
//!
//! A layer computes a pre-activation ("net") value `z = W x + b` and then applies
//! the network's activation function element-wise: `a = activation(z)`.
//!
//! Every activation is paired with its derivative, expressed in terms of the
//! *post-activation* value `a`. Backpropagation only keeps the activations of a
//! forward pass around, so it never needs the nets to compute a delta.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Element-wise activation function shared by every layer of a network.
pub enum Activation {
    /// Logistic sigmoid `1 / (1 + e^-x)`.
    Sigmoid,
    /// Rectified linear `max(0, x)`.
    ReLU,
    /// Heaviside step: `1` if `x > 0`, else `0`.
    UnitStep,
}

impl Activation {
    pub const ALL: [Activation; 3] = [Activation::Sigmoid, Activation::ReLU, Activation::UnitStep];

    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::ReLU => x.max(0.0),
            Activation::UnitStep => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Derivative of the activation with respect to its input, expressed in terms
    /// of the post-activation output `a`.
    ///
    /// The unit step is flat everywhere it is differentiable, so it yields `0` and
    /// a unit-step network does not learn through backpropagation.
    #[inline]
    pub fn derivative_from_output(self, a: f64) -> f64 {
        match self {
            Activation::Sigmoid => a * (1.0 - a),
            Activation::ReLU => {
                if a > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::UnitStep => 0.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::ReLU => "relu",
            Activation::UnitStep => "unitstep",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = Error;

    /// Case-insensitive: `sigmoid`, `relu`, `unitstep`.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Activation::ALL
            .into_iter()
            .find(|act| act.name() == wanted)
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "unknown activation function {s:?}: choose one of [sigmoid, relu, unitstep]"
                ))
            })
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    // Numerically stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}
