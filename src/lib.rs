pub mod error;
pub mod math;
pub mod activation;
pub mod neuron;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod persist;
pub mod data;

// Convenience re-exports
pub use error::{NetError, Result};
pub use activation::activation::ActivationKind;
pub use neuron::neuron::Neuron;
pub use layers::{DenseLayer, Layer, LayerKind, PoolingKind, PoolingLayer};
pub use network::network::Network;
pub use network::spec::{LayerSpec, NetworkSpec};
pub use optim::sgd::Sgd;
pub use persist::codec::SavePolicy;
pub use train::{test, EpochStats, TrainConfig, Trainer};
pub use data::Dataset;
