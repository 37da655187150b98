use rand::Rng;

use crate::activation::activation::ActivationKind;
use crate::error::{NetError, Result};
use crate::math::init::normal_weights;
use crate::math::vector::dot;

/// A single weighted-sum unit with its own activation.
///
/// `weights.len()` is the neuron's input arity and never changes after
/// construction; `set_parameters` refuses vectors of another length.
#[derive(Debug, Clone)]
pub struct Neuron {
    weights: Vec<f64>,
    bias: f64,
    activation: ActivationKind,
    output: f64,
    delta: f64,
}

impl Neuron {
    /// Weights drawn from N(0, 0.5), bias zero.
    pub fn new<R: Rng + ?Sized>(input_size: usize, activation: ActivationKind, rng: &mut R) -> Neuron {
        Neuron::with_parameters(normal_weights(input_size, rng), 0.0, activation)
    }

    /// Builds a neuron with fixed parameters instead of random ones.
    pub fn with_parameters(weights: Vec<f64>, bias: f64, activation: ActivationKind) -> Neuron {
        Neuron {
            weights,
            bias,
            activation,
            output: 0.0,
            delta: 0.0,
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn activation(&self) -> ActivationKind {
        self.activation
    }

    /// Output of the last `forward` call.
    pub fn output(&self) -> f64 {
        self.output
    }

    /// Error signal from the last `backward` call.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Replaces weights and bias. The weight count must equal the current arity.
    pub fn set_parameters(&mut self, weights: Vec<f64>, bias: f64) -> Result<()> {
        if weights.len() != self.weights.len() {
            return Err(NetError::shape("neuron weights", self.weights.len(), weights.len()));
        }
        self.weights = weights;
        self.bias = bias;
        Ok(())
    }

    pub fn forward(&mut self, inputs: &[f64]) -> Result<f64> {
        self.check_arity(inputs)?;
        let sum = self.bias + dot(&self.weights, inputs);
        self.output = self.activation.function(sum);
        Ok(self.output)
    }

    /// `delta = error * f'(output)`, using the output cached by `forward`.
    pub fn backward(&mut self, error: f64) {
        self.delta = error * self.activation.derivative(self.output);
    }

    pub fn apply_gradient(&mut self, inputs: &[f64], learning_rate: f64) -> Result<()> {
        self.check_arity(inputs)?;
        let step = learning_rate * self.delta;
        for (w, x) in self.weights.iter_mut().zip(inputs.iter()) {
            *w -= step * x;
        }
        self.bias -= step;
        Ok(())
    }

    fn check_arity(&self, inputs: &[f64]) -> Result<()> {
        if inputs.len() != self.weights.len() {
            return Err(NetError::shape("neuron inputs", self.weights.len(), inputs.len()));
        }
        Ok(())
    }
}
