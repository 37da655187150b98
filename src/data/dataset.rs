use crate::error::{NetError, Result};

/// Index-aligned input vectors and class labels.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub inputs: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
}

impl Dataset {
    pub fn new(inputs: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Dataset> {
        if inputs.len() != labels.len() {
            return Err(NetError::InvalidData(format!(
                "{} inputs but {} labels",
                inputs.len(),
                labels.len()
            )));
        }
        Ok(Dataset { inputs, labels })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Width of the input vectors, or 0 for an empty dataset.
    pub fn input_size(&self) -> usize {
        self.inputs.first().map_or(0, Vec::len)
    }
}
