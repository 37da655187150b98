use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layers::dense::DenseLayer;
use crate::layers::pooling::PoolingLayer;

/// Discriminant of the layer variants. `Convolutional` is reserved and
/// cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    Dense,
    Convolutional,
    Pooling,
}

/// One stage of a network. The variant set is closed; dispatch is by `match`.
#[derive(Debug, Clone)]
pub enum Layer {
    Dense(DenseLayer),
    Pooling(PoolingLayer),
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Dense(_) => LayerKind::Dense,
            Layer::Pooling(_) => LayerKind::Pooling,
        }
    }

    pub fn input_size(&self) -> usize {
        match self {
            Layer::Dense(dense) => dense.input_size(),
            Layer::Pooling(pool) => pool.input_size(),
        }
    }

    /// Length of the vector `forward` returns.
    pub fn size(&self) -> usize {
        match self {
            Layer::Dense(dense) => dense.size(),
            Layer::Pooling(pool) => pool.size(),
        }
    }

    pub fn is_trainable(&self) -> bool {
        matches!(self, Layer::Dense(_))
    }

    pub fn as_dense(&self) -> Option<&DenseLayer> {
        match self {
            Layer::Dense(dense) => Some(dense),
            Layer::Pooling(_) => None,
        }
    }

    pub fn as_dense_mut(&mut self) -> Option<&mut DenseLayer> {
        match self {
            Layer::Dense(dense) => Some(dense),
            Layer::Pooling(_) => None,
        }
    }

    pub fn forward(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        match self {
            Layer::Dense(dense) => dense.forward(inputs),
            Layer::Pooling(pool) => pool.forward(inputs),
        }
    }

    pub fn backward(&mut self, errors: &[f64]) -> Result<()> {
        match self {
            Layer::Dense(dense) => dense.backward(errors),
            Layer::Pooling(pool) => pool.backward(errors),
        }
    }

    pub fn apply_gradient(&mut self, inputs: &[f64], learning_rate: f64) -> Result<()> {
        match self {
            Layer::Dense(dense) => dense.apply_gradient(inputs, learning_rate),
            Layer::Pooling(pool) => pool.apply_gradient(inputs, learning_rate),
        }
    }
}

impl From<DenseLayer> for Layer {
    fn from(layer: DenseLayer) -> Self {
        Layer::Dense(layer)
    }
}

impl From<PoolingLayer> for Layer {
    fn from(layer: PoolingLayer) -> Self {
        Layer::Pooling(layer)
    }
}
