// Training driver: load config and datasets, train a fresh network, save it.

use anyhow::{Context, Result};
use log::info;

use trendnet::config::load_config;
use trendnet::dataset::load_dataset;
use trendnet::encoding::VECTOR_SIZE;
use trendnet::persist;
use trendnet::utils::SimpleRng;
use trendnet::Network;

const DEFAULT_CONFIG: &str = "config/train.json";

// Fixed topology of the word classifier.
const HIDDEN1_SIZE: usize = 128;
const HIDDEN2_SIZE: usize = 64;
const OUTPUT_SIZE: usize = 1;

fn main() -> Result<()> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config =
        load_config(&config_path).with_context(|| format!("loading config from {config_path}"))?;

    let (vectors, labels) = load_dataset(&config.train_data)
        .with_context(|| format!("loading training data from {}", config.train_data.display()))?;
    info!("loaded {} training samples", vectors.len());

    let (val_vectors, val_labels) = load_dataset(&config.validation_data).with_context(|| {
        format!(
            "loading validation data from {}",
            config.validation_data.display()
        )
    })?;
    info!("loaded {} validation samples", val_vectors.len());

    if !labels.is_empty() {
        let trendy = labels.iter().filter(|&&label| label == 1.0).count();
        info!(
            "training set balance: {:.2}% trending, {:.2}% not trending",
            trendy as f64 / labels.len() as f64 * 100.0,
            (labels.len() - trendy) as f64 / labels.len() as f64 * 100.0
        );
    }
    if !val_labels.is_empty() {
        let trendy = val_labels.iter().filter(|&&label| label == 1.0).count();
        info!(
            "validation set: {:.2}% trending words",
            trendy as f64 / val_labels.len() as f64 * 100.0
        );
    }

    let mut rng = match config.seed {
        Some(seed) => SimpleRng::new(seed),
        None => {
            let mut rng = SimpleRng::new(0);
            rng.reseed_from_time();
            rng
        }
    };

    let mut network = Network::new(VECTOR_SIZE, HIDDEN1_SIZE, HIDDEN2_SIZE, OUTPUT_SIZE, &mut rng);
    let outcome = network
        .train(
            &vectors,
            &val_vectors,
            &labels,
            &val_labels,
            &config.options(),
            &mut rng,
        )
        .context("training failed")?;

    info!(
        "stopped after {} epochs ({:?}), best validation accuracy {:.2}%",
        outcome.epochs_run, outcome.stop_reason, outcome.best_val_accuracy
    );

    persist::save(&network, &config.network_file)
        .with_context(|| format!("saving network to {}", config.network_file.display()))?;
    info!("done, network saved to {}", config.network_file.display());

    Ok(())
}
