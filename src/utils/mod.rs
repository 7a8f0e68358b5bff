//! Shared utilities for the network engine
//!
//! This module provides random number generation and the scalar activation
//! functions used across the forward and backward passes.

pub mod activations;
pub mod rng;

pub use activations::{relu, relu_derivative, sigmoid};
pub use rng::SimpleRng;
