//! Reader for the IDX container used by the MNIST image/label files.
//!
//! Layout: a 4-byte big-endian magic number (two zero bytes, a type code and the
//! number of dimensions), one big-endian `u32` per dimension, then the payload
//! in row-major order. Only unsigned-byte payloads are decoded.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::{Dataset, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    UnsignedByte,
    SignedByte,
    Short,
    Int,
    Float,
    Double,
}

impl DataType {
    pub fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0x08 => DataType::UnsignedByte,
            0x09 => DataType::SignedByte,
            0x0B => DataType::Short,
            0x0C => DataType::Int,
            0x0D => DataType::Float,
            0x0E => DataType::Double,
            other => {
                return Err(Error::InvalidData(format!(
                    "unknown IDX type code {other:#04x}"
                )));
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub labels: Vec<u8>,
}

/// Images with pixels scaled from `0..=255` to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Images {
    pub count: usize,
    pub rows: usize,
    pub cols: usize,
    /// Row-major `(count, rows * cols)`.
    pub pixels: Vec<f64>,
}

impl Images {
    #[inline]
    pub fn pixels_per_image(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns the `idx`-th image as a flat row-major slice.
    ///
    /// Panics if `idx >= count`.
    pub fn image(&self, idx: usize) -> &[f64] {
        let n = self.pixels_per_image();
        &self.pixels[idx * n..(idx + 1) * n]
    }
}

struct Header {
    data_type: DataType,
    dims: Vec<usize>,
}

fn read_header<R: Read>(reader: &mut R) -> Result<Header> {
    let mut magic = [0u8; 4];
    read_exact(reader, &mut magic, "magic number")?;
    if magic[0] != 0 || magic[1] != 0 {
        return Err(Error::InvalidData(format!(
            "bad IDX magic number {:#010x}",
            u32::from_be_bytes(magic)
        )));
    }
    let data_type = DataType::from_code(magic[2])?;

    let mut dims = Vec::with_capacity(usize::from(magic[3]));
    for _ in 0..magic[3] {
        let mut buf = [0u8; 4];
        read_exact(reader, &mut buf, "dimension size")?;
        dims.push(u32::from_be_bytes(buf) as usize);
    }
    Ok(Header { data_type, dims })
}

fn read_payload<R: Read>(reader: &mut R, header: &Header, expected_dims: usize) -> Result<Vec<u8>> {
    if header.data_type != DataType::UnsignedByte {
        return Err(Error::InvalidData(format!(
            "only unsigned-byte IDX payloads are supported, got {:?}",
            header.data_type
        )));
    }
    if header.dims.len() != expected_dims {
        return Err(Error::InvalidData(format!(
            "expected {expected_dims} IDX dimensions, got {}",
            header.dims.len()
        )));
    }
    let len = header
        .dims
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| Error::InvalidData("IDX payload size overflows".to_owned()))?;

    // Sized by the bytes that arrive, never by the declared dimensions.
    let mut payload = Vec::new();
    reader.take(len as u64).read_to_end(&mut payload)?;
    if payload.len() != len {
        return Err(Error::InvalidData(format!(
            "IDX file truncated in payload: header declares {len} bytes, found {}",
            payload.len()
        )));
    }
    Ok(payload)
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::InvalidData(format!("IDX file truncated in {what}")),
        _ => Error::Io(e),
    })
}

pub fn read_labels<R: Read>(mut reader: R) -> Result<Labels> {
    let header = read_header(&mut reader)?;
    let labels = read_payload(&mut reader, &header, 1)?;
    debug!(count = labels.len(), "read IDX labels");
    Ok(Labels { labels })
}

pub fn read_images<R: Read>(mut reader: R) -> Result<Images> {
    let header = read_header(&mut reader)?;
    let raw = read_payload(&mut reader, &header, 3)?;
    let (count, rows, cols) = (header.dims[0], header.dims[1], header.dims[2]);
    debug!(count, rows, cols, "read IDX images");
    Ok(Images {
        count,
        rows,
        cols,
        pixels: raw.into_iter().map(|px| f64::from(px) / 255.0).collect(),
    })
}

pub fn read_labels_file(path: impl AsRef<Path>) -> Result<Labels> {
    read_labels(BufReader::new(File::open(path)?))
}

pub fn read_images_file(path: impl AsRef<Path>) -> Result<Images> {
    read_images(BufReader::new(File::open(path)?))
}

/// Pairs images with one-hot encoded labels over `classes` outputs.
pub fn to_dataset(images: &Images, labels: &Labels, classes: usize) -> Result<Dataset> {
    if images.count != labels.labels.len() {
        return Err(Error::InvalidData(format!(
            "{} images but {} labels",
            images.count,
            labels.labels.len()
        )));
    }

    let mut targets = vec![0.0; labels.labels.len() * classes];
    for (i, &label) in labels.labels.iter().enumerate() {
        let label = usize::from(label);
        if label >= classes {
            return Err(Error::InvalidData(format!(
                "label {label} at index {i} is out of range for {classes} classes"
            )));
        }
        targets[i * classes + label] = 1.0;
    }

    Dataset::from_flat(
        images.pixels.clone(),
        targets,
        images.pixels_per_image(),
        classes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx_bytes(type_code: u8, dims: &[u32], payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0, 0, type_code, dims.len() as u8];
        for d in dims {
            out.extend_from_slice(&d.to_be_bytes());
        }
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn reads_labels() {
        let bytes = idx_bytes(0x08, &[3], &[7, 0, 9]);
        let labels = read_labels(bytes.as_slice()).unwrap();
        assert_eq!(labels.labels, vec![7, 0, 9]);
    }

    #[test]
    fn reads_and_normalizes_images() {
        let bytes = idx_bytes(0x08, &[2, 1, 2], &[0, 255, 51, 102]);
        let images = read_images(bytes.as_slice()).unwrap();
        assert_eq!((images.count, images.rows, images.cols), (2, 1, 2));
        assert_eq!(images.image(0), &[0.0, 1.0]);
        assert!((images.image(1)[0] - 0.2).abs() < 1e-12);
        assert!((images.image(1)[1] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn rejects_truncated_and_unsupported_files() {
        let bytes = idx_bytes(0x08, &[4], &[1, 2]);
        assert!(matches!(read_labels(bytes.as_slice()), Err(Error::InvalidData(_))));

        let bytes = idx_bytes(0x0D, &[1], &[0, 0, 0, 0]);
        assert!(matches!(read_labels(bytes.as_slice()), Err(Error::InvalidData(_))));

        let bytes = idx_bytes(0x08, &[2], &[1, 2]);
        assert!(matches!(read_images(bytes.as_slice()), Err(Error::InvalidData(_))));

        let mut bytes = idx_bytes(0x08, &[1], &[1]);
        bytes[0] = 1;
        assert!(matches!(read_labels(bytes.as_slice()), Err(Error::InvalidData(_))));
    }

    #[test]
    fn huge_declared_payload_is_truncation_not_allocation() {
        let bytes = idx_bytes(0x08, &[u32::MAX, u32::MAX, 1], &[]);
        assert_eq!(bytes.len(), 16);
        let err = read_images(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)), "{err:?}");

        let bytes = idx_bytes(0x08, &[u32::MAX], &[1, 2, 3]);
        assert!(matches!(read_labels(bytes.as_slice()), Err(Error::InvalidData(_))));
    }

    #[test]
    fn type_codes() {
        assert_eq!(DataType::from_code(0x0E).unwrap(), DataType::Double);
        assert!(DataType::from_code(0x0A).is_err());
    }

    #[test]
    fn one_hot_dataset() {
        let images = read_images(idx_bytes(0x08, &[2, 1, 1], &[0, 255]).as_slice()).unwrap();
        let labels = read_labels(idx_bytes(0x08, &[2], &[2, 0]).as_slice()).unwrap();
        let data = to_dataset(&images, &labels, 3).unwrap();
        assert_eq!(data.target(0), &[0.0, 0.0, 1.0]);
        assert_eq!(data.target(1), &[1.0, 0.0, 0.0]);
        assert_eq!(data.input(1), &[1.0]);

        assert!(to_dataset(&images, &labels, 2).is_err());
    }
}
