//! Base64 dump of per-layer vectors, used as golden regression fixtures.
//!
//! Each vector is written as a little-endian `u64` length followed by its
//! values as little-endian `f64`; the whole byte stream is encoded with the
//! standard base64 alphabet. This is not a model persistence format.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{Activation, Error, Network, Result};

/// Topology of the golden regression network.
pub const REGRESSION_DIMS: [usize; 3] = [2, 2, 1];
/// Augmented weights of the golden regression network, bias in the last column.
pub const REGRESSION_WEIGHTS: [&[f64]; 2] = [&[6.0, 0.0, -2.0, 2.0, -2.0, 0.0], &[-4.0, 2.0, 2.0]];
pub const REGRESSION_INPUT: [f64; 2] = [1.0, 0.0];

/// Sigmoid `[2, 2, 1]` network loaded with [`REGRESSION_WEIGHTS`].
pub fn regression_network() -> Result<Network> {
    let mut network = Network::new_with_seed(&REGRESSION_DIMS, Activation::Sigmoid, 1.0, 0)?;
    network.set_weights(&REGRESSION_WEIGHTS)?;
    Ok(network)
}

/// Runs the regression network on [`REGRESSION_INPUT`] and encodes
/// `(activations, nets)`.
pub fn regression_fixtures() -> Result<(String, String)> {
    let record = regression_network()?.forward(&REGRESSION_INPUT)?;
    Ok((
        encode_vectors(record.activations()),
        encode_vectors(record.nets()),
    ))
}

pub fn encode_vectors(vectors: &[Vec<f64>]) -> String {
    let mut bytes = Vec::new();
    for v in vectors {
        bytes.extend_from_slice(&(v.len() as u64).to_le_bytes());
        for x in v {
            bytes.extend_from_slice(&x.to_le_bytes());
        }
    }
    STANDARD.encode(bytes)
}

pub fn decode_vectors(encoded: &str) -> Result<Vec<Vec<f64>>> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::InvalidData(format!("fixture is not valid base64: {e}")))?;

    let mut vectors = Vec::new();
    let mut rest = bytes.as_slice();
    while !rest.is_empty() {
        let (len, tail) = take_u64(rest)?;
        let len = usize::try_from(len)
            .map_err(|_| Error::InvalidData(format!("fixture vector length {len} is too large")))?;
        if tail.len() / 8 < len {
            return Err(Error::InvalidData(format!(
                "fixture vector claims {len} values, only {} bytes left",
                tail.len()
            )));
        }
        let (values, tail) = tail.split_at(len * 8);
        vectors.push(
            values
                .chunks_exact(8)
                .map(|c| {
                    let mut buf = [0u8; 8];
                    buf.copy_from_slice(c);
                    f64::from_le_bytes(buf)
                })
                .collect(),
        );
        rest = tail;
    }
    Ok(vectors)
}

fn take_u64(bytes: &[u8]) -> Result<(u64, &[u8])> {
    if bytes.len() < 8 {
        return Err(Error::InvalidData(
            "fixture ends inside a vector header".to_owned(),
        ));
    }
    let (head, tail) = bytes.split_at(8);
    let mut buf = [0u8; 8];
    buf.copy_from_slice(head);
    Ok((u64::from_le_bytes(buf), tail))
}
