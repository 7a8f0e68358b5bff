//! trendnet — word-trend classification from character-frequency signatures
//!
//! A small fully-connected network (two ReLU hidden layers with inverted
//! dropout, one sigmoid output unit) trained with manual backpropagation and
//! single-example Adam updates, plus the glue a working classifier needs:
//! word normalization and encoding, CSV dataset loading, JSON snapshot
//! persistence and a JSON-configured training loop.
//!
//! # Modules
//!
//! - `encoding`: word normalization and feature vectors
//! - `network`: parameters, forward and backward passes, inference
//! - `optimizer`: Adam with per-parameter moment estimates
//! - `train`: epochs, early stopping, best-snapshot checkpointing
//! - `dataset`: CSV loading and min-max feature scaling
//! - `persist`: network snapshot save/load with validation
//! - `config`: training configuration from JSON
//! - `utils`: seedable RNG and activation functions

pub mod config;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod network;
pub mod optimizer;
pub mod persist;
pub mod train;
pub mod utils;

pub use error::NetworkError;
pub use network::{Activation, Activations, Gradients, LayerSpec, Network, DROPOUT_RATE};
pub use train::{EpochStats, StopReason, TrainMode, TrainOptions, TrainOutcome};
