use rand::Rng;

use crate::activation::activation::ActivationKind;
use crate::error::{NetError, Result};
use crate::neuron::neuron::Neuron;

/// A fully connected layer: every neuron sees the whole input vector.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub neurons: Vec<Neuron>,
    pub activation: ActivationKind,
    input_size: usize,
}

impl DenseLayer {
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationKind,
        rng: &mut R,
    ) -> DenseLayer {
        let neurons = (0..size)
            .map(|_| Neuron::new(input_size, activation, rng))
            .collect();
        DenseLayer { neurons, activation, input_size }
    }

    /// Builds a layer from explicit per-neuron weights (row `n` = neuron `n`)
    /// and biases. All rows must have the same length.
    pub fn from_parameters(
        weights: Vec<Vec<f64>>,
        biases: Vec<f64>,
        activation: ActivationKind,
    ) -> Result<DenseLayer> {
        if weights.is_empty() {
            return Err(NetError::InvalidConfiguration(
                "dense layer needs at least one neuron".to_owned(),
            ));
        }
        if weights.len() != biases.len() {
            return Err(NetError::shape("dense layer biases", weights.len(), biases.len()));
        }
        let input_size = weights[0].len();
        let mut neurons = Vec::with_capacity(weights.len());
        for (row, bias) in weights.into_iter().zip(biases) {
            if row.len() != input_size {
                return Err(NetError::shape("dense layer weight row", input_size, row.len()));
            }
            neurons.push(Neuron::with_parameters(row, bias, activation));
        }
        Ok(DenseLayer { neurons, activation, input_size })
    }

    pub fn size(&self) -> usize {
        self.neurons.len()
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn forward(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        if inputs.len() != self.input_size {
            return Err(NetError::shape("dense layer inputs", self.input_size, inputs.len()));
        }
        self.neurons.iter_mut().map(|n| n.forward(inputs)).collect()
    }

    pub fn backward(&mut self, errors: &[f64]) -> Result<()> {
        if errors.len() != self.neurons.len() {
            return Err(NetError::shape("dense layer errors", self.neurons.len(), errors.len()));
        }
        for (neuron, &error) in self.neurons.iter_mut().zip(errors) {
            neuron.backward(error);
        }
        Ok(())
    }

    pub fn apply_gradient(&mut self, inputs: &[f64], learning_rate: f64) -> Result<()> {
        if inputs.len() != self.input_size {
            return Err(NetError::shape("dense layer inputs", self.input_size, inputs.len()));
        }
        for neuron in &mut self.neurons {
            neuron.apply_gradient(inputs, learning_rate)?;
        }
        Ok(())
    }

    /// Error attributed to each input of this layer: `Σ_k w[k][n] * delta[k]`.
    /// Only meaningful after `backward`.
    pub fn propagated_errors(&self) -> Vec<f64> {
        let mut errors = vec![0.0; self.input_size];
        for neuron in &self.neurons {
            let delta = neuron.delta();
            for (e, w) in errors.iter_mut().zip(neuron.weights()) {
                *e += w * delta;
            }
        }
        errors
    }
}
