use std::time::Instant;

use crate::data::Dataset;
use crate::error::{ConfigError, DataError, TrainError};
use crate::loss::bce::BceLoss;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::Optimizer;
use crate::train::epoch_stats::{EpochHistory, EpochStats};
use crate::train::train_config::TrainConfig;

/// Where the driver is within an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    EpochIdle,
    BatchIterating,
    EpochComplete,
}

/// Owns the network and optimizer for a whole run.
///
/// Mini-batches are processed strictly one after another: each batch's
/// update is visible to the next batch's forward pass. The optimizer (and
/// with it Adam's timestep) lives as long as the trainer.
pub struct Trainer {
    network: Network,
    optimizer: Optimizer,
    config: TrainConfig,
    history: EpochHistory,
    state: TrainerState,
    epochs_run: usize,
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

impl Trainer {
    pub fn new(network: Network, config: TrainConfig) -> Result<Trainer, ConfigError> {
        config.validate()?;
        let optimizer = Optimizer::new(config.optimizer, config.learning_rate);
        Ok(Trainer {
            network,
            optimizer,
            config,
            history: EpochHistory::new(),
            state: TrainerState::EpochIdle,
            epochs_run: 0,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    pub fn optimizer(&self) -> &Optimizer {
        &self.optimizer
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn history(&self) -> &EpochHistory {
        &self.history
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    /// One forward/backward/update cycle. Returns the batch cost.
    pub fn train_batch(&mut self, batch: &Matrix, labels: &Matrix) -> Result<f64, TrainError> {
        self.check_features(batch)?;
        if batch.rows != labels.rows {
            return Err(DataError::RowMismatch { features: batch.rows, labels: labels.rows }.into());
        }

        let (gradients, prediction) = self.network.compute_gradients(batch, labels);
        let cost = BceLoss::cost(&prediction, labels, self.network.spec().epsilon);

        self.optimizer.step(self.network.params_mut(), &gradients)?;
        Ok(cost)
    }

    /// Runs one pass over `data` in contiguous mini-batches and appends the
    /// last batch's cost to the history.
    pub fn run_epoch(&mut self, data: &Dataset) -> Result<EpochStats, TrainError> {
        self.check_features(data.features())?;
        let t_start = Instant::now();
        let epoch = self.epochs_run;

        self.state = TrainerState::BatchIterating;
        let mut last_cost = 0.0;
        let mut total_cost = 0.0;
        let mut batches = 0;

        for (batch, labels) in data.batches(self.config.batch_size) {
            let cost = match self.train_batch(&batch, &labels) {
                Ok(cost) => cost,
                Err(e) => {
                    self.state = TrainerState::EpochIdle;
                    return Err(e);
                }
            };
            log::trace!("epoch {} batch {} cost {:.6}", epoch, batches, cost);
            last_cost = cost;
            total_cost += cost;
            batches += 1;
        }

        self.state = TrainerState::EpochComplete;
        self.history.push(epoch, last_cost);
        self.epochs_run += 1;

        let stats = EpochStats {
            epoch,
            total_epochs: self.config.epochs,
            cost: last_cost,
            mean_batch_cost: total_cost / batches as f64,
            batches,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        log::debug!(
            "epoch {} done: cost {:.6}, mean batch cost {:.6}, {} batches",
            stats.epoch, stats.cost, stats.mean_batch_cost, stats.batches
        );

        Ok(stats)
    }

    /// Trains for `config.epochs` epochs, calling `on_epoch` after each one.
    pub fn fit<F>(&mut self, data: &Dataset, mut on_epoch: F) -> Result<&EpochHistory, TrainError>
    where
        F: FnMut(&Trainer, &EpochStats),
    {
        for _ in 0..self.config.epochs {
            let stats = self.run_epoch(data)?;
            on_epoch(&*self, &stats);
        }
        Ok(&self.history)
    }

    /// Percentage of examples in `data` the network classifies correctly.
    pub fn accuracy(&self, data: &Dataset) -> Result<f64, TrainError> {
        self.check_features(data.features())?;
        Ok(accuracy(&self.network, data.features(), data.labels()))
    }

    fn check_features(&self, batch: &Matrix) -> Result<(), TrainError> {
        let expected = self.network.n_features();
        if batch.cols != expected {
            return Err(TrainError::FeatureMismatch { expected, got: batch.cols });
        }
        Ok(())
    }
}

/// Rounds the network's prediction to {0, 1} and returns the percentage of
/// rows equal to `labels`.
pub fn accuracy(network: &Network, features: &Matrix, labels: &Matrix) -> f64 {
    let n = features.rows;
    if n == 0 {
        return 0.0;
    }
    let prediction = network.predict(features);
    let correct = prediction.data.iter().zip(labels.data.iter())
        .filter(|(p, y)| p == y)
        .count();
    correct as f64 / n as f64 * 100.0
}
