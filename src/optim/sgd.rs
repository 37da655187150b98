use crate::{error::Result, network::network::Network};

/// Plain per-example gradient descent.
#[derive(Debug, Clone, Copy)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one update using the deltas of the last `backward` call.
    /// `inputs` must be the example the preceding `forward` saw.
    pub fn step(&self, network: &mut Network, inputs: &[f64]) -> Result<()> {
        network.apply_gradient(inputs, self.learning_rate)
    }
}
