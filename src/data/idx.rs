//! Reader for IDX files as used by MNIST and its derivatives.
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x03        (number of dimensions)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (big-endian u32)
//! bytes 12-15:  cols        (big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-3:   0x00 0x00 0x08 0x01
//! bytes  4-7:   N           (big-endian u32)
//! bytes  8..:   N bytes, one class index each
//! ```

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::data::dataset::Dataset;
use crate::error::{NetError, Result};

const IMAGE_HEADER_LEN: usize = 16;
const LABEL_HEADER_LEN: usize = 8;

/// Reads an IDX3 image file into vectors of pixels scaled to `[0, 1]`.
///
/// `limit` caps the number of images read; the header count is used when it
/// is `None` or larger than the file.
pub fn load_inputs(path: impl AsRef<Path>, limit: Option<usize>) -> Result<Vec<Vec<f64>>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| NetError::io(path, e))?;
    parse_inputs(&bytes, limit)
}

/// Reads an IDX1 label file.
pub fn load_labels(path: impl AsRef<Path>, limit: Option<usize>) -> Result<Vec<usize>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| NetError::io(path, e))?;
    parse_labels(&bytes, limit)
}

/// Reads an image file and its label file into one aligned `Dataset`.
pub fn load_dataset(
    images: impl AsRef<Path>,
    labels: impl AsRef<Path>,
    limit: Option<usize>,
) -> Result<Dataset> {
    Dataset::new(load_inputs(images, limit)?, load_labels(labels, limit)?)
}

pub fn parse_inputs(bytes: &[u8], limit: Option<usize>) -> Result<Vec<Vec<f64>>> {
    check_header(bytes, IMAGE_HEADER_LEN, 3, "image")?;
    let declared = read_u32(bytes, 4);
    let rows = read_u32(bytes, 8);
    let cols = read_u32(bytes, 12);
    let n_pixels = rows.checked_mul(cols).ok_or_else(|| {
        NetError::InvalidData(format!("IDX image file: {rows}x{cols} overflows"))
    })?;
    let count = limit.map_or(declared, |l| l.min(declared));
    let needed = count
        .checked_mul(n_pixels)
        .and_then(|n| n.checked_add(IMAGE_HEADER_LEN))
        .ok_or_else(|| NetError::InvalidData("IDX image file: data length overflows".to_owned()))?;
    if bytes.len() < needed {
        return Err(NetError::InvalidData(format!(
            "IDX image file too short: {count} images of {rows}x{cols} need {needed} bytes, file has {}",
            bytes.len()
        )));
    }
    debug!(declared, count, rows, cols, "reading IDX images");
    if n_pixels == 0 {
        return Ok(vec![Vec::new(); count]);
    }
    Ok(bytes[IMAGE_HEADER_LEN..needed]
        .chunks_exact(n_pixels)
        .map(|chunk| chunk.iter().map(|&px| px as f64 / 255.0).collect())
        .collect())
}

pub fn parse_labels(bytes: &[u8], limit: Option<usize>) -> Result<Vec<usize>> {
    check_header(bytes, LABEL_HEADER_LEN, 1, "label")?;
    let declared = read_u32(bytes, 4);
    let count = limit.map_or(declared, |l| l.min(declared));
    if bytes.len() < LABEL_HEADER_LEN + count {
        return Err(NetError::InvalidData(format!(
            "IDX label file too short: {count} labels need {} bytes, file has {}",
            LABEL_HEADER_LEN + count,
            bytes.len()
        )));
    }
    debug!(declared, count, "reading IDX labels");
    Ok(bytes[LABEL_HEADER_LEN..LABEL_HEADER_LEN + count]
        .iter()
        .map(|&label| label as usize)
        .collect())
}

fn check_header(bytes: &[u8], header_len: usize, dims: u8, what: &str) -> Result<()> {
    if bytes.len() < header_len {
        return Err(NetError::InvalidData(format!(
            "IDX {what} file too short: expected at least {header_len} header bytes, got {}",
            bytes.len()
        )));
    }
    if bytes[0] != 0 || bytes[1] != 0 {
        return Err(NetError::InvalidData(format!(
            "IDX {what} file: reserved bytes must be zero, got 0x{:02X} 0x{:02X}",
            bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(NetError::InvalidData(format!(
            "IDX {what} file: dtype must be 0x08 (uint8), got 0x{:02X}",
            bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(NetError::InvalidData(format!(
            "IDX {what} file: expected {dims} dimensions, got {}",
            bytes[3]
        )));
    }
    Ok(())
}

fn read_u32(bytes: &[u8], at: usize) -> usize {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_file(images: &[[u8; 4]]) -> Vec<u8> {
        let mut bytes = vec![0, 0, 0x08, 0x03];
        bytes.extend_from_slice(&(images.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&2u32.to_be_bytes());
        for image in images {
            bytes.extend_from_slice(image);
        }
        bytes
    }

    fn label_file(labels: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0, 0, 0x08, 0x01];
        bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        bytes.extend_from_slice(labels);
        bytes
    }

    #[test]
    fn pixels_are_normalized() {
        let bytes = image_file(&[[0, 255, 51, 0], [255, 255, 255, 255]]);
        let inputs = parse_inputs(&bytes, None).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0], vec![0.0, 1.0, 0.2, 0.0]);
        assert!(inputs[1].iter().all(|&p| p == 1.0));
    }

    #[test]
    fn limit_caps_and_clamps() {
        let bytes = image_file(&[[1; 4], [2; 4], [3; 4]]);
        assert_eq!(parse_inputs(&bytes, Some(2)).unwrap().len(), 2);
        assert_eq!(parse_inputs(&bytes, Some(10)).unwrap().len(), 3);
        assert_eq!(parse_labels(&label_file(&[7, 1, 4]), Some(1)).unwrap(), vec![7]);
    }

    #[test]
    fn bad_headers_are_rejected() {
        let mut bytes = image_file(&[[0; 4]]);
        bytes[3] = 0x01;
        assert!(matches!(parse_inputs(&bytes, None), Err(NetError::InvalidData(_))));
        assert!(parse_labels(&[0, 0, 0x08], None).is_err());
        let truncated = &image_file(&[[0; 4], [0; 4]])[..20];
        assert!(parse_inputs(truncated, None).is_err());
    }

    #[test]
    fn files_load_into_aligned_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images.idx3");
        let labels = dir.path().join("labels.idx1");
        fs::write(&images, image_file(&[[0; 4], [255; 4]])).unwrap();
        fs::write(&labels, label_file(&[3, 9])).unwrap();

        let data = load_dataset(&images, &labels, None).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.input_size(), 4);
        assert_eq!(data.labels, vec![3, 9]);

        assert!(matches!(
            load_inputs(dir.path().join("missing"), None),
            Err(NetError::Io { .. })
        ));
    }
}
