use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Fewer than three layer widths, or a zero-width layer.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
    /// Replacement weights whose shape disagrees with the existing layers.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    /// Input/target vector whose length disagrees with the network.
    #[error("dimension mismatch: expected {expected} values for {what}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
