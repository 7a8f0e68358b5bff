//! Training configuration
//!
//! This module provides the configuration structure consumed by the training
//! driver, parsed from a JSON file and validated before use.
//!
//! # Example
//!
//! ```json
//! {
//!   "mode": "epochs",
//!   "max_epochs": 5000,
//!   "target_accuracy": 95.0,
//!   "learning_rate": 0.001,
//!   "seed": 42,
//!   "train_data": "data/data.csv",
//!   "validation_data": "data/test.csv",
//!   "network_file": "data/network.json",
//!   "checkpoint_file": "data/best_network.json"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::dataset::Scaling;
use crate::error::NetworkError;
use crate::train::{TrainMode, TrainOptions};

/// Configuration for a training run.
///
/// `target_accuracy` is only meaningful in `"error"` mode, where it is the
/// training-accuracy percentage that ends the run. Omitting `seed` seeds
/// the generator from the clock, making runs non-reproducible.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Stopping regime: `"epochs"` or `"error"`.
    pub mode: TrainMode,

    /// Upper bound on training epochs (applies in both modes).
    pub max_epochs: usize,

    /// Training-accuracy target in percent, used by `"error"` mode.
    pub target_accuracy: f64,

    /// Adam base learning rate.
    pub learning_rate: f64,

    /// Seed for the run's random generator; absent means time-seeded.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Whether validation forward passes draw dropout masks (default true).
    #[serde(default = "default_dropout_in_validation")]
    pub dropout_in_validation: bool,

    /// Feature scaling strategy (default `"per_dataset"`).
    #[serde(default = "default_scaling")]
    pub scaling: Scaling,

    /// CSV file with training records.
    pub train_data: PathBuf,

    /// CSV file with validation records.
    pub validation_data: PathBuf,

    /// Where the trained network snapshot is written.
    pub network_file: PathBuf,

    /// Optional path updated with the best snapshot during training.
    #[serde(default)]
    pub checkpoint_file: Option<PathBuf>,
}

fn default_dropout_in_validation() -> bool {
    true
}

fn default_scaling() -> Scaling {
    Scaling::PerDataset
}

impl TrainingConfig {
    /// The training-loop options described by this configuration.
    pub fn options(&self) -> TrainOptions {
        TrainOptions {
            mode: self.mode,
            max_epochs: self.max_epochs,
            target_accuracy: self.target_accuracy,
            learning_rate: self.learning_rate,
            dropout_in_validation: self.dropout_in_validation,
            scaling: self.scaling,
            checkpoint_path: self.checkpoint_file.clone(),
        }
    }
}

/// Load a training configuration from a JSON file.
///
/// Returns `Ok(TrainingConfig)` on success, or an error if the file cannot
/// be read, the JSON is invalid, or a value is out of range.
pub fn load_config(path: impl AsRef<Path>) -> Result<TrainingConfig, NetworkError> {
    let contents = fs::read_to_string(path)?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &TrainingConfig) -> Result<(), NetworkError> {
    if config.max_epochs == 0 {
        return Err(NetworkError::InvalidConfig(
            "max_epochs must be greater than 0".into(),
        ));
    }

    if config.learning_rate <= 0.0 {
        return Err(NetworkError::InvalidConfig(
            "learning_rate must be positive".into(),
        ));
    }

    if config.mode == TrainMode::ByError
        && !(0.0..=100.0).contains(&config.target_accuracy)
    {
        return Err(NetworkError::InvalidConfig(
            "target_accuracy must be a percentage in [0, 100]".into(),
        ));
    }

    Ok(())
}
