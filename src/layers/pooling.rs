//! Fixed spatial reduction over a 2-D input.
//!
//! The input is stored column by column: `input_width` runs of `input_height`
//! values, so cell `(x, y)` sits at `x * input_height + y`. Outputs use the
//! same order with the output dimensions. Pooling has no trainable state and
//! does not participate in backpropagation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{NetError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolingKind {
    Max,
    Average,
    Min,
}

impl fmt::Display for PoolingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolingKind::Max => "max",
            PoolingKind::Average => "average",
            PoolingKind::Min => "min",
        };
        f.write_str(name)
    }
}

impl FromStr for PoolingKind {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" => Ok(PoolingKind::Max),
            "average" | "avg" | "mean" => Ok(PoolingKind::Average),
            "min" => Ok(PoolingKind::Min),
            other => Err(NetError::InvalidConfiguration(format!(
                "unknown pooling kind '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolingLayer {
    pub kind: PoolingKind,
    pub input_width: usize,
    pub input_height: usize,
    pub stride: usize,
}

impl PoolingLayer {
    pub fn new(kind: PoolingKind, input_width: usize, input_height: usize, stride: usize) -> Result<PoolingLayer> {
        if stride == 0 {
            return Err(NetError::InvalidConfiguration("pooling stride must be at least 1".to_owned()));
        }
        if stride > input_width || stride > input_height {
            return Err(NetError::InvalidConfiguration(format!(
                "pooling stride {stride} exceeds input {input_width}x{input_height}"
            )));
        }
        if input_width.checked_mul(input_height).is_none() {
            return Err(NetError::InvalidConfiguration(format!(
                "pooling input {input_width}x{input_height} is too large"
            )));
        }
        Ok(PoolingLayer { kind, input_width, input_height, stride })
    }

    pub fn input_size(&self) -> usize {
        self.input_width.saturating_mul(self.input_height)
    }

    pub fn output_width(&self) -> usize {
        self.input_width / self.stride
    }

    pub fn output_height(&self) -> usize {
        self.input_height / self.stride
    }

    pub fn size(&self) -> usize {
        self.output_width() * self.output_height()
    }

    pub fn forward(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        if inputs.len() != self.input_size() {
            return Err(NetError::shape("pooling layer inputs", self.input_size(), inputs.len()));
        }
        let (out_w, out_h) = (self.output_width(), self.output_height());
        let mut outputs = Vec::with_capacity(out_w * out_h);
        for x in 0..out_w {
            for y in 0..out_h {
                let window = (0..self.stride).flat_map(|k| {
                    let start = (x * self.stride + k) * self.input_height + y * self.stride;
                    inputs[start..start + self.stride].iter().copied()
                });
                let value = match self.kind {
                    PoolingKind::Max => window.fold(f64::MIN, f64::max),
                    PoolingKind::Min => window.fold(f64::MAX, f64::min),
                    PoolingKind::Average => {
                        window.sum::<f64>() / (self.stride * self.stride) as f64
                    }
                };
                outputs.push(value);
            }
        }
        Ok(outputs)
    }

    pub fn backward(&mut self, _errors: &[f64]) -> Result<()> {
        Err(NetError::UnsupportedOperation(
            "pooling layer does not support backpropagation".to_owned(),
        ))
    }

    pub fn apply_gradient(&mut self, _inputs: &[f64], _learning_rate: f64) -> Result<()> {
        Err(NetError::UnsupportedOperation(
            "pooling layer has no trainable parameters".to_owned(),
        ))
    }
}
