use std::sync::mpsc;

use crate::train::epoch_stats::EpochStats;

/// Configuration for a `Trainer` run.
///
/// # Fields
/// - `epochs`        — number of sampled windows to train on
/// - `learning_rate` — SGD step size
/// - `batch_size`    — length of the contiguous window drawn each epoch;
///                     must be in `1..=inputs.len()`
/// - `seed`          — seeds the window sampler, making runs reproducible
/// - `progress_tx`   — optional channel receiving every `EpochStats`; if the
///                     receiver is dropped, training stops after that epoch
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub seed: u64,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` with seed 0 and no progress channel.
    pub fn new(epochs: usize, learning_rate: f64, batch_size: usize) -> Self {
        TrainConfig {
            epochs,
            learning_rate,
            batch_size,
            seed: 0,
            progress_tx: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
