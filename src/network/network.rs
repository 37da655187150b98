use std::path::Path;

use rand::Rng;

use crate::error::{NetError, Result};
use crate::layers::dense::DenseLayer;
use crate::layers::layer::Layer;
use crate::layers::pooling::PoolingLayer;
use crate::loss::one_hot::OneHotLoss;
use crate::math::vector::argmax;
use crate::network::spec::{LayerSpec, NetworkSpec};
use crate::persist::codec::{self, SavePolicy};

/// An ordered, fixed stack of layers.
///
/// The network owns every layer and the per-layer output vectors of the most
/// recent forward pass (`activations[l]` is layer `l`'s output). That arena is
/// replaced as a whole on each successful `forward`.
#[derive(Debug, Clone)]
pub struct Network {
    input_size: usize,
    layers: Vec<Layer>,
    activations: Vec<Vec<f64>>,
    has_forward: bool,
}

impl Network {
    /// Builds layers left to right, each spec's width becoming the next
    /// layer's input size. Dense weights are drawn from `rng`.
    pub fn new<R: Rng + ?Sized>(input_size: usize, specs: &[LayerSpec], rng: &mut R) -> Result<Network> {
        if specs.is_empty() {
            return Err(NetError::InvalidConfiguration(
                "a network needs at least one layer".to_owned(),
            ));
        }
        let mut layers = Vec::with_capacity(specs.len());
        let mut width = input_size;
        for spec in specs {
            let layer: Layer = match *spec {
                LayerSpec::Dense { size, activation } => {
                    if size == 0 {
                        return Err(NetError::InvalidConfiguration(
                            "dense layer needs at least one neuron".to_owned(),
                        ));
                    }
                    DenseLayer::new(size, width, activation, rng).into()
                }
                LayerSpec::Pooling { pooling, input_width, input_height, stride } => {
                    PoolingLayer::new(pooling, input_width, input_height, stride)?.into()
                }
                LayerSpec::Convolutional => {
                    return Err(NetError::InvalidConfiguration(
                        "convolutional layers are not implemented".to_owned(),
                    ));
                }
            };
            if layer.input_size() != width {
                return Err(NetError::shape("layer input size", width, layer.input_size()));
            }
            width = layer.size();
            layers.push(layer);
        }
        Network::from_layers(input_size, layers)
    }

    pub fn from_spec<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
        Network::new(spec.input_size, &spec.layers, rng)
    }

    /// Assembles a network from already-built layers, checking that each
    /// layer's input size matches the width feeding it.
    pub fn from_layers(input_size: usize, layers: Vec<Layer>) -> Result<Network> {
        if layers.is_empty() {
            return Err(NetError::InvalidConfiguration(
                "a network needs at least one layer".to_owned(),
            ));
        }
        let mut width = input_size;
        for layer in &layers {
            if layer.input_size() != width {
                return Err(NetError::shape("layer input size", width, layer.input_size()));
            }
            width = layer.size();
        }
        let activations = layers.iter().map(|l| vec![0.0; l.size()]).collect();
        Ok(Network {
            input_size,
            layers,
            activations,
            has_forward: false,
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, Layer::size)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Runs every layer in order and returns the predicted class.
    ///
    /// The input length is checked before anything is touched.
    pub fn forward(&mut self, inputs: &[f64]) -> Result<usize> {
        if inputs.len() != self.input_size {
            return Err(NetError::shape("network inputs", self.input_size, inputs.len()));
        }
        let mut activations: Vec<Vec<f64>> = Vec::with_capacity(self.layers.len());
        for layer in &mut self.layers {
            let input = activations.last().map_or(inputs, Vec::as_slice);
            let output = layer.forward(input)?;
            activations.push(output);
        }
        self.activations = activations;
        self.has_forward = true;
        Ok(self.prediction())
    }

    /// Last layer's activations from the most recent forward pass
    /// (all zeros before the first one).
    pub fn outputs(&self) -> &[f64] {
        self.activations.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Argmax of `outputs()`, ties going to the lowest index.
    pub fn prediction(&self) -> usize {
        argmax(self.outputs())
    }

    pub fn predict(&mut self, inputs: &[f64]) -> Result<usize> {
        self.forward(inputs)
    }

    /// Computes every neuron's delta for a one-hot target at `label`.
    ///
    /// The output error is `outputs - one_hot(label)` regardless of the
    /// output activation. Hidden layers take `Σ_k w[k][n] * delta[k]` from the
    /// layer above, visited from the second-to-last layer down to the first.
    pub fn backward(&mut self, label: usize) -> Result<()> {
        if !self.has_forward {
            return Err(NetError::NoForwardPass);
        }
        self.ensure_trainable()?;
        let classes = self.output_size();
        if label >= classes {
            return Err(NetError::LabelOutOfRange { label, classes });
        }

        let errors = OneHotLoss::derivative(self.outputs(), label);
        let last = self.layers.len() - 1;
        self.layers[last].backward(&errors)?;

        for l in (0..last).rev() {
            let errors = self.layers[l + 1]
                .as_dense()
                .map(DenseLayer::propagated_errors)
                .ok_or_else(untrainable)?;
            self.layers[l].backward(&errors)?;
        }
        Ok(())
    }

    /// Gradient step for every layer: layer 0 against `inputs`, layer `l > 0`
    /// against layer `l - 1`'s cached output.
    pub fn apply_gradient(&mut self, inputs: &[f64], learning_rate: f64) -> Result<()> {
        if !self.has_forward {
            return Err(NetError::NoForwardPass);
        }
        if inputs.len() != self.input_size {
            return Err(NetError::shape("network inputs", self.input_size, inputs.len()));
        }
        self.ensure_trainable()?;
        for (l, layer) in self.layers.iter_mut().enumerate() {
            let layer_inputs: &[f64] = if l == 0 { inputs } else { &self.activations[l - 1] };
            layer.apply_gradient(layer_inputs, learning_rate)?;
        }
        Ok(())
    }

    /// Writes all dense parameters under `root`. See [`crate::persist::codec`].
    pub fn save(&self, root: impl AsRef<Path>, policy: SavePolicy) -> Result<()> {
        codec::save(self, root.as_ref(), policy)
    }

    /// Reads parameters saved by `save` into this (already built) network.
    pub fn load(&mut self, root: impl AsRef<Path>) -> Result<()> {
        codec::load(self, root.as_ref())
    }

    fn ensure_trainable(&self) -> Result<()> {
        if self.layers.iter().all(Layer::is_trainable) {
            Ok(())
        } else {
            Err(untrainable())
        }
    }
}

fn untrainable() -> NetError {
    NetError::UnsupportedOperation(
        "network contains a pooling layer, which does not support backpropagation".to_owned(),
    )
}
