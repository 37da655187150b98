use serde::{Deserialize, Serialize};
use std::f64::consts::E;
use std::fmt;
use std::str::FromStr;

use crate::error::NetError;

/// The closed set of neuron nonlinearities.
///
/// Derivatives are expressed in terms of the cached post-activation output,
/// which is exact for these three functions and is what `Neuron::backward`
/// feeds in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationKind {
    Linear,
    Sigmoid,
    ReLU,
}

impl ActivationKind {
    /// Element-wise activation of a pre-activation sum.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationKind::Linear => x,
            ActivationKind::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationKind::ReLU => if x > 0.0 { x } else { 0.0 },
        }
    }

    /// Derivative evaluated at the output `y = function(x)`.
    pub fn derivative(&self, y: f64) -> f64 {
        match self {
            ActivationKind::Linear => 1.0,
            ActivationKind::Sigmoid => y * (1.0 - y),
            ActivationKind::ReLU => if y > 0.0 { 1.0 } else { 0.0 },
        }
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivationKind::Linear => "linear",
            ActivationKind::Sigmoid => "sigmoid",
            ActivationKind::ReLU => "relu",
        };
        f.write_str(name)
    }
}

impl FromStr for ActivationKind {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" | "identity" => Ok(ActivationKind::Linear),
            "sigmoid" => Ok(ActivationKind::Sigmoid),
            "relu" => Ok(ActivationKind::ReLU),
            other => Err(NetError::InvalidConfiguration(format!(
                "unknown activation kind '{other}'"
            ))),
        }
    }
}
