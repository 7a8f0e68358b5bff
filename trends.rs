// Inference demo: load a trained snapshot and classify a fixed word list.

use anyhow::{Context, Result};

use trendnet::encoding;
use trendnet::persist;

const DEFAULT_NETWORK: &str = "data/network.json";

const TEST_WORDS: &[&str] = &[
    "кот",
    "программа",
    "база",
    "данные",
    "it",
    "идти",
    "ai",
    "бегун",
    "лететь",
    "data",
    "воздух",
    "ленивый",
    "ноутбук",
    "главные",
    "метров",
    "стране",
];

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_NETWORK.to_string());
    let network =
        persist::load(&path).with_context(|| format!("loading network from {path}"))?;

    for word in TEST_WORDS {
        let verdict = if network.is_trendy(word) {
            "is trend"
        } else {
            "not trend"
        };

        // Recompute the raw output for display alongside the verdict.
        let normalized = encoding::normalize(word);
        let vector = encoding::word_to_vector(&normalized);
        let confidence = network
            .forward(&vector, None)
            .map(|activations| activations.output[0] * 100.0)
            .unwrap_or(0.0);

        println!("word '{word}': {verdict} (confidence: {confidence:.2}%)");
    }

    Ok(())
}
