//! Network snapshot persistence
//!
//! Serializes a [`Network`] to a JSON file and back. Loading validates the
//! declared sizes and every buffer length before handing the network to the
//! caller, so a corrupt snapshot can never produce a usable network.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::NetworkError;
use crate::network::Network;

/// Write a snapshot of the network to `path`, replacing any existing file.
pub fn save(network: &Network, path: impl AsRef<Path>) -> Result<(), NetworkError> {
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), network)?;
    Ok(())
}

/// Load and validate a network snapshot from `path`.
pub fn load(path: impl AsRef<Path>) -> Result<Network, NetworkError> {
    let file = File::open(path)?;
    let network: Network = serde_json::from_reader(BufReader::new(file))?;
    network.validate()?;
    Ok(network)
}
