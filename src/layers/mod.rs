pub mod dense;
pub mod layer;
pub mod pooling;

pub use dense::DenseLayer;
pub use layer::{Layer, LayerKind};
pub use pooling::{PoolingKind, PoolingLayer};
