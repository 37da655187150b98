use serde::{Deserialize, Serialize};

/// Result of one periodic evaluation during training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean one-hot squared error over this epoch's training window.
    pub window_loss: f64,
    pub correct: usize,
    pub total: usize,
    /// `correct / total`, in [0, 1].
    pub accuracy: f64,
    /// Whether the accuracy was measured on a held-out set rather than the
    /// training data.
    pub held_out: bool,
    /// Wall-clock duration of the epoch including evaluation.
    pub elapsed_ms: u64,
}
