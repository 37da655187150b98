use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::{NetError, Result};
use crate::loss::one_hot::OneHotLoss;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// Drives a `Network` through windowed per-example gradient descent.
///
/// Each epoch draws one contiguous window of `batch_size` examples with a
/// uniformly random start and runs forward → backward → update on every
/// example in it, in order. Gradients are not accumulated across the window.
pub struct Trainer {
    config: TrainConfig,
    optimizer: Sgd,
    rng: StdRng,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Trainer {
        let rng = StdRng::seed_from_u64(config.seed);
        let optimizer = Sgd::new(config.learning_rate);
        Trainer { config, optimizer, rng }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Trains `network` in place and returns the stats of every evaluation.
    ///
    /// Evaluation uses `eval` when given, otherwise the training set. All
    /// argument checks happen before the first epoch.
    pub fn train(
        &mut self,
        network: &mut Network,
        inputs: &[Vec<f64>],
        labels: &[usize],
        eval: Option<(&[Vec<f64>], &[usize])>,
    ) -> Result<Vec<EpochStats>> {
        check_aligned(inputs, labels)?;
        if inputs.is_empty() {
            return Err(NetError::InvalidConfiguration("no training examples".to_owned()));
        }
        let batch_size = self.config.batch_size;
        if batch_size == 0 || batch_size > inputs.len() {
            return Err(NetError::InvalidConfiguration(format!(
                "batch size {batch_size} must be between 1 and the number of examples ({})",
                inputs.len()
            )));
        }
        if !self.config.learning_rate.is_finite() {
            return Err(NetError::InvalidConfiguration(format!(
                "learning rate {} is not finite",
                self.config.learning_rate
            )));
        }
        let (eval_inputs, eval_labels, held_out) = match eval {
            Some((ei, el)) => {
                check_aligned(ei, el)?;
                (ei, el, true)
            }
            None => (inputs, labels, false),
        };

        let epochs = self.config.epochs;
        let mut history = Vec::new();
        for epoch in 1..=epochs {
            let t_start = Instant::now();

            let start = self.rng.gen_range(0..=inputs.len() - batch_size);
            let mut window_loss = 0.0;
            for b in start..start + batch_size {
                network.forward(&inputs[b])?;
                window_loss += OneHotLoss::loss(network.outputs(), labels[b]);
                network.backward(labels[b])?;
                self.optimizer.step(network, &inputs[b])?;
            }
            window_loss /= batch_size as f64;
            debug!(epoch, start, window_loss, "window trained");

            if !should_evaluate(epoch, epochs) {
                continue;
            }
            let correct = count_correct(network, eval_inputs, eval_labels)?;
            let total = eval_inputs.len();
            let accuracy = if total == 0 { 0.0 } else { correct as f64 / total as f64 };
            let stats = EpochStats {
                epoch,
                total_epochs: epochs,
                window_loss,
                correct,
                total,
                accuracy,
                held_out,
                elapsed_ms: t_start.elapsed().as_millis() as u64,
            };
            info!(epoch, epochs, correct, total, accuracy, "evaluation");
            history.push(stats.clone());

            if let Some(ref tx) = self.config.progress_tx {
                if tx.send(stats).is_err() {
                    debug!(epoch, "progress receiver dropped, stopping");
                    break;
                }
            }
        }
        Ok(history)
    }
}

/// Fraction of `inputs` whose prediction equals the label.
pub fn test(network: &mut Network, inputs: &[Vec<f64>], labels: &[usize]) -> Result<f64> {
    check_aligned(inputs, labels)?;
    if inputs.is_empty() {
        return Err(NetError::InvalidConfiguration("no test examples".to_owned()));
    }
    let correct = count_correct(network, inputs, labels)?;
    Ok(correct as f64 / inputs.len() as f64)
}

/// Evaluation schedule: the first and last epochs, every `epochs / 10`-th
/// epoch, and every epoch when there are fewer than ten.
pub fn should_evaluate(epoch: usize, epochs: usize) -> bool {
    epochs < 10 || epoch == 1 || epoch == epochs || epoch % (epochs / 10) == 0
}

fn count_correct(network: &mut Network, inputs: &[Vec<f64>], labels: &[usize]) -> Result<usize> {
    let mut correct = 0;
    for (input, &label) in inputs.iter().zip(labels) {
        if network.predict(input)? == label {
            correct += 1;
        }
    }
    Ok(correct)
}

fn check_aligned(inputs: &[Vec<f64>], labels: &[usize]) -> Result<()> {
    if inputs.len() != labels.len() {
        return Err(NetError::InvalidConfiguration(format!(
            "{} inputs but {} labels",
            inputs.len(),
            labels.len()
        )));
    }
    Ok(())
}
