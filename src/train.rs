//! Training loop: shuffled single-example Adam epochs with early stopping
//!
//! Drives epochs over a labeled dataset, one Adam update per sample, with
//! class-imbalance weighting of the reported loss, per-epoch validation,
//! best-snapshot checkpointing and two independent stall detectors. The
//! network returned at the end is always the best-validation-accuracy
//! snapshot seen during the run, not the final epoch's parameters.

use std::path::PathBuf;

use log::info;
use serde::Deserialize;

use crate::dataset::Scaling;
use crate::error::NetworkError;
use crate::network::Network;
use crate::optimizer::Adam;
use crate::persist;
use crate::utils::SimpleRng;

/// Epochs without average-loss improvement before the loop stalls out.
pub const PATIENCE: usize = 100;

/// Epochs without validation-accuracy improvement before the loop stalls out.
pub const PATIENCE_VALIDATION: usize = 100;

/// Stability constant inside the cross-entropy logarithms.
const LOSS_EPSILON: f64 = 1e-10;

/// When the training loop considers itself done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TrainMode {
    /// Run until the epoch budget is spent (stall detectors still apply).
    #[serde(rename = "epochs")]
    ByEpochs,
    /// Additionally stop once training accuracy reaches the target.
    #[serde(rename = "error")]
    ByError,
}

/// Why a training run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `ByError` mode reached the target training accuracy.
    TargetAccuracyReached,
    /// Average training loss failed to improve for [`PATIENCE`] epochs.
    LossStalled,
    /// Validation accuracy failed to improve for [`PATIENCE_VALIDATION`] epochs.
    ValidationStalled,
    /// All epochs of the budget were used.
    EpochBudgetExhausted,
}

/// Knobs for one training run.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub mode: TrainMode,
    pub max_epochs: usize,
    /// Training-accuracy percentage that ends a `ByError` run.
    pub target_accuracy: f64,
    pub learning_rate: f64,
    /// Draw dropout masks during validation forward passes too.
    pub dropout_in_validation: bool,
    /// How train/validation feature matrices are scaled before training.
    pub scaling: Scaling,
    /// Persist the network here whenever validation accuracy improves.
    pub checkpoint_path: Option<PathBuf>,
}

impl TrainOptions {
    /// Options with the conventional defaults: dropout active during
    /// validation, independent per-dataset scaling, no checkpoint file.
    pub fn new(mode: TrainMode, max_epochs: usize, target_accuracy: f64, learning_rate: f64) -> Self {
        Self {
            mode,
            max_epochs,
            target_accuracy,
            learning_rate,
            dropout_in_validation: true,
            scaling: Scaling::PerDataset,
            checkpoint_path: None,
        }
    }
}

/// Bookkeeping captured after each epoch.
#[derive(Debug, Clone, Copy)]
pub struct EpochStats {
    /// One-based epoch number.
    pub epoch: usize,
    pub avg_loss: f64,
    /// Training accuracy over the epoch, in percent.
    pub train_accuracy: f64,
    /// Validation accuracy after the epoch, in percent.
    pub val_accuracy: f64,
}

/// Result of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub stop_reason: StopReason,
    pub epochs_run: usize,
    /// Best validation accuracy seen; the returned network achieved it.
    pub best_val_accuracy: f64,
    pub history: Vec<EpochStats>,
}

impl Network {
    /// Train in place on `dataset`, validating against `val_dataset`.
    ///
    /// Feature matrices are scaled per `options.scaling`, the sample order
    /// is reshuffled every epoch with `rng`, and every sample triggers one
    /// forward pass (dropout on), one backward pass and one Adam step.
    /// After the run the network holds the parameters of the best
    /// validation epoch.
    ///
    /// The reported loss is class-weighted: the minority class counts for
    /// more, `weight = n / (2 * class_count)`.
    pub fn train(
        &mut self,
        dataset: &[Vec<f64>],
        val_dataset: &[Vec<f64>],
        labels: &[f64],
        val_labels: &[f64],
        options: &TrainOptions,
        rng: &mut SimpleRng,
    ) -> Result<TrainOutcome, NetworkError> {
        if dataset.is_empty() || val_dataset.is_empty() {
            return Err(NetworkError::EmptyDataset);
        }
        if labels.len() != dataset.len() {
            return Err(NetworkError::ShapeMismatch {
                what: "labels",
                expected: dataset.len(),
                got: labels.len(),
            });
        }
        if val_labels.len() != val_dataset.len() {
            return Err(NetworkError::ShapeMismatch {
                what: "validation labels",
                expected: val_dataset.len(),
                got: val_labels.len(),
            });
        }

        info!(
            "starting training: {} samples, {} validation samples, {} epochs max",
            dataset.len(),
            val_dataset.len(),
            options.max_epochs
        );

        let (normalized, normalized_val) = options.scaling.apply(dataset, val_dataset);

        let total = labels.len() as f64;
        let trend_count = labels.iter().filter(|&&label| label == 1.0).count() as f64;
        let non_trend_count = total - trend_count;
        let trend_weight = total / (2.0 * trend_count);
        let non_trend_weight = total / (2.0 * non_trend_count);

        let mut adam = Adam::new(self, options.learning_rate);

        let mut best = self.clone();
        let mut best_loss = f64::INFINITY;
        let mut best_val_accuracy = 0.0;
        let mut no_improvement = 0;
        let mut no_val_improvement = 0;

        let mut history = Vec::new();
        let mut stop_reason = StopReason::EpochBudgetExhausted;
        let mut epochs_run = 0;

        for epoch in 0..options.max_epochs {
            epochs_run = epoch + 1;

            let indices = rng.perm(normalized.len());
            let mut total_loss = 0.0;
            let mut correct = 0usize;

            for &idx in &indices {
                let input = &normalized[idx];
                let target = labels[idx];

                let activations = self.forward(input, Some(&mut *rng))?;
                let predicted = activations.output[0];

                let weight = if target == 1.0 {
                    trend_weight
                } else {
                    non_trend_weight
                };
                total_loss += weight
                    * -(target * (predicted + LOSS_EPSILON).ln()
                        + (1.0 - target) * (1.0 - predicted + LOSS_EPSILON).ln());

                if (predicted > 0.5 && target == 1.0) || (predicted <= 0.5 && target == 0.0) {
                    correct += 1;
                }

                let gradients = self.backward(input, target, &activations);
                adam.step(self, &gradients);
            }

            let avg_loss = total_loss / normalized.len() as f64;
            let train_accuracy = correct as f64 / normalized.len() as f64 * 100.0;

            let mut val_correct = 0usize;
            for (input, &target) in normalized_val.iter().zip(val_labels) {
                let dropout = if options.dropout_in_validation {
                    Some(&mut *rng)
                } else {
                    None
                };
                let predicted = self.forward(input, dropout)?.output[0];
                if (predicted > 0.5 && target == 1.0) || (predicted <= 0.5 && target == 0.0) {
                    val_correct += 1;
                }
            }
            let val_accuracy = val_correct as f64 / normalized_val.len() as f64 * 100.0;

            info!(
                "epoch {}/{}: avg loss {:.6}, accuracy (train) {:.2}%, accuracy (validation) {:.2}%",
                epoch + 1,
                options.max_epochs,
                avg_loss,
                train_accuracy,
                val_accuracy
            );
            history.push(EpochStats {
                epoch: epoch + 1,
                avg_loss,
                train_accuracy,
                val_accuracy,
            });

            if val_accuracy > best_val_accuracy {
                best_val_accuracy = val_accuracy;
                best = self.clone();
                if let Some(path) = &options.checkpoint_path {
                    persist::save(self, path)?;
                }
                no_val_improvement = 0;
            } else {
                no_val_improvement += 1;
            }

            if options.mode == TrainMode::ByError && train_accuracy >= options.target_accuracy {
                info!("target accuracy {:.2}% reached, stopping", train_accuracy);
                stop_reason = StopReason::TargetAccuracyReached;
                break;
            }

            if avg_loss < best_loss {
                best_loss = avg_loss;
                no_improvement = 0;
            } else {
                no_improvement += 1;
                if no_improvement >= PATIENCE {
                    info!("average loss stalled for {} epochs, stopping", PATIENCE);
                    stop_reason = StopReason::LossStalled;
                    break;
                }
            }

            if no_val_improvement >= PATIENCE_VALIDATION {
                info!(
                    "validation accuracy stalled for {} epochs, stopping",
                    PATIENCE_VALIDATION
                );
                stop_reason = StopReason::ValidationStalled;
                break;
            }
        }

        *self = best;
        info!(
            "training finished: best validation accuracy {:.2}%",
            best_val_accuracy
        );

        Ok(TrainOutcome {
            stop_reason,
            epochs_run,
            best_val_accuracy,
            history,
        })
    }
}
