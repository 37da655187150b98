/// Error of an output vector against a one-hot target at `label`.
///
/// The gradient is `output - target` no matter which activation produced the
/// outputs; with sigmoid outputs this is the usual squared-error shortcut, not
/// a true cross-entropy gradient.
pub struct OneHotLoss;

impl OneHotLoss {
    /// Mean squared distance to the one-hot target. Used for reporting only.
    pub fn loss(outputs: &[f64], label: usize) -> f64 {
        if outputs.is_empty() {
            return 0.0;
        }
        outputs.iter().enumerate()
            .map(|(n, o)| (o - target(n, label)).powi(2))
            .sum::<f64>() / outputs.len() as f64
    }

    /// Per-output error: `outputs[n] - (1 if n == label else 0)`.
    pub fn derivative(outputs: &[f64], label: usize) -> Vec<f64> {
        outputs.iter().enumerate()
            .map(|(n, o)| o - target(n, label))
            .collect()
    }
}

fn target(n: usize, label: usize) -> f64 {
    if n == label { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivative_subtracts_one_at_label() {
        assert_eq!(OneHotLoss::derivative(&[0.2, 0.7, 0.1], 1), vec![0.2, 0.7 - 1.0, 0.1]);
    }

    #[test]
    fn loss_is_zero_on_exact_target() {
        assert_eq!(OneHotLoss::loss(&[0.0, 1.0], 1), 0.0);
        assert!((OneHotLoss::loss(&[1.0, 0.0], 1) - 1.0).abs() < 1e-12);
    }
}
