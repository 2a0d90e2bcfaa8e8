//! A feed-forward multilayer perceptron trained with online backpropagation.
//!
//! `mlp-engine` represents a network as a stack of dense layers sharing one
//! pointwise activation function. It computes forward activations for an input
//! vector and adapts the weights in place from a single `(input, target)` pair.
//!
//! # Design goals
//!
//! - Reproducible: every random draw goes through an RNG the caller controls.
//! - Clear contracts: shapes are validated at the API boundary and reported as
//!   [`Error`] values before any arithmetic runs.
//! - Correct gradients for every activation: each [`Activation`] carries its own
//!   derivative, and backpropagation always reads a layer's weights before
//!   updating them.
//!
//! # Data layout and shapes
//!
//! - Scalars are `f64`.
//! - Layer weights are row-major with shape `(out_dim, in_dim)`, the bias is a
//!   separate `out_dim` vector.
//! - [`Network::set_weights`] and [`Network::describe`] use the *augmented*
//!   `(out_dim, in_dim + 1)` view, with the bias as trailing column.
//!
//! # Quick start
//!
//! ```rust
//! use mlp_engine::{Activation, Network};
//!
//! # fn main() -> mlp_engine::Result<()> {
//! let mut net = Network::new_with_seed(&[2, 2, 1], Activation::Sigmoid, 1.0, 0)?;
//!
//! let record = net.forward(&[1.0, 0.0])?;
//! assert_eq!(record.output().len(), 1);
//! assert_eq!(record.nets().len(), 2);
//!
//! net.adapt(&[1.0, 0.0], &[1.0], 0.05)?;
//! println!("{net}");
//! # Ok(())
//! # }
//! ```
//!
//! # Allocation-free training (advanced)
//!
//! Allocate the buffers once and reuse them across steps:
//!
//! ```rust
//! use mlp_engine::{Activation, Network};
//!
//! # fn main() -> mlp_engine::Result<()> {
//! let mut net = Network::new_with_seed(&[3, 8, 2], Activation::Sigmoid, 1.0, 0)?;
//! let mut trainer = net.trainer();
//!
//! for _ in 0..500 {
//!     net.adapt_with(&mut trainer, &[0.1, -0.2, 0.3], &[0.0, 1.0], 0.5)?;
//! }
//!
//! let mut record = net.record();
//! let y = net.forward_into(&[0.1, -0.2, 0.3], &mut record)?;
//! assert!(y[1] > y[0]);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod data;
pub mod dump;
pub mod error;
pub mod idx;
pub mod layer;
pub mod metrics;
pub mod network;
pub mod train;

pub use activation::Activation;
pub use data::{Dataset, XorConfig, generate_xor};
pub use error::{Error, Result};
pub use layer::Layer;
pub use network::{ActivationRecord, Network, Trainer};
pub use train::{EvalReport, FitReport, TrainConfig};
