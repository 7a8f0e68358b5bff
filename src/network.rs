//! Three-layer fully-connected network for word-trend classification
//!
//! This module owns the trainable parameters and the forward and backward
//! passes. The topology is fixed: two ReLU hidden layers with inverted
//! dropout, then a single sigmoid output unit. Weight matrices are stored
//! flat in row-major order, so `w1[j * hidden1_size + i]` is the weight from
//! input `j` to hidden unit `i`.

use serde::{Deserialize, Serialize};

use crate::encoding;
use crate::error::NetworkError;
use crate::utils::{relu, relu_derivative, sigmoid, SimpleRng};

/// Probability of zeroing a hidden unit during a dropout forward pass.
pub const DROPOUT_RATE: f64 = 0.1;

/// L2 penalty coefficient added to every weight gradient.
pub const L2_LAMBDA: f64 = 0.001;

/// Activation applied by a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Sigmoid,
}

/// Shape and activation of one layer in the fixed topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSpec {
    /// Number of inputs feeding the layer.
    pub inputs: usize,
    /// Number of units the layer produces.
    pub units: usize,
    /// Activation applied to the layer's pre-activations.
    pub activation: Activation,
}

/// Activations captured by a forward pass.
///
/// The hidden activations are stored post-dropout; the backward pass needs
/// them exactly as the output was computed from them.
#[derive(Debug, Clone)]
pub struct Activations {
    pub hidden1: Vec<f64>,
    pub hidden2: Vec<f64>,
    pub output: Vec<f64>,
}

/// Per-parameter gradients produced by one backward pass.
///
/// Buffers mirror the network's parameter layout: flat row-major weight
/// matrices and per-unit bias vectors. Weight gradients already include the
/// L2 penalty term.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub w1: Vec<f64>,
    pub b1: Vec<f64>,
    pub w2: Vec<f64>,
    pub b2: Vec<f64>,
    pub w3: Vec<f64>,
    pub b3: Vec<f64>,
}

/// Fully-connected network with two hidden layers and a sigmoid output.
///
/// Construction randomly initializes all parameters; training mutates them
/// in place. A network is also the unit of persistence: the whole parameter
/// set round-trips through serde as one snapshot.
///
/// # Example
///
/// ```
/// use trendnet::network::Network;
/// use trendnet::utils::SimpleRng;
///
/// let mut rng = SimpleRng::new(42);
/// let network = Network::new(60, 128, 64, 1, &mut rng);
/// assert_eq!(network.input_size(), 60);
/// assert_eq!(network.parameter_count(), 60 * 128 + 128 * 64 + 64 + 128 + 64 + 1);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct Network {
    input_size: usize,
    hidden1_size: usize,
    hidden2_size: usize,
    output_size: usize,
    w1: Vec<f64>,
    w2: Vec<f64>,
    w3: Vec<f64>,
    b1: Vec<f64>,
    b2: Vec<f64>,
    b3: Vec<f64>,
}

impl Network {
    /// Create a network with randomly initialized parameters.
    ///
    /// The hidden layers use He initialization (`N(0,1) * sqrt(2/fan_in)`),
    /// the output layer a Xavier-scaled Gaussian
    /// (`N(0,1) * sqrt(6/(fan_in+fan_out))`), and biases a small Gaussian.
    ///
    /// # Panics
    ///
    /// Panics if any layer size is zero.
    pub fn new(
        input_size: usize,
        hidden1_size: usize,
        hidden2_size: usize,
        output_size: usize,
        rng: &mut SimpleRng,
    ) -> Self {
        assert!(
            input_size > 0 && hidden1_size > 0 && hidden2_size > 0 && output_size > 0,
            "layer sizes must be positive"
        );

        let he_w1 = (2.0 / input_size as f64).sqrt();
        let w1 = (0..input_size * hidden1_size)
            .map(|_| rng.next_gaussian() * he_w1)
            .collect();

        let he_w2 = (2.0 / hidden1_size as f64).sqrt();
        let w2 = (0..hidden1_size * hidden2_size)
            .map(|_| rng.next_gaussian() * he_w2)
            .collect();

        let xavier_w3 = (6.0 / (hidden2_size + output_size) as f64).sqrt();
        let w3 = (0..hidden2_size * output_size)
            .map(|_| rng.next_gaussian() * xavier_w3)
            .collect();

        let b1 = (0..hidden1_size).map(|_| rng.next_gaussian() * 0.1).collect();
        let b2 = (0..hidden2_size).map(|_| rng.next_gaussian() * 0.1).collect();
        let b3 = (0..output_size).map(|_| rng.next_gaussian() * 0.1).collect();

        Self {
            input_size,
            hidden1_size,
            hidden2_size,
            output_size,
            w1,
            w2,
            w3,
            b1,
            b2,
            b3,
        }
    }

    /// Number of input features.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Width of the first hidden layer.
    pub fn hidden1_size(&self) -> usize {
        self.hidden1_size
    }

    /// Width of the second hidden layer.
    pub fn hidden2_size(&self) -> usize {
        self.hidden2_size
    }

    /// Number of output units.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// First-layer weights, row-major (input_size x hidden1_size).
    pub fn w1(&self) -> &[f64] {
        &self.w1
    }

    /// Second-layer weights, row-major (hidden1_size x hidden2_size).
    pub fn w2(&self) -> &[f64] {
        &self.w2
    }

    /// Output-layer weights, row-major (hidden2_size x output_size).
    pub fn w3(&self) -> &[f64] {
        &self.w3
    }

    /// First hidden layer biases.
    pub fn b1(&self) -> &[f64] {
        &self.b1
    }

    /// Second hidden layer biases.
    pub fn b2(&self) -> &[f64] {
        &self.b2
    }

    /// Output layer biases.
    pub fn b3(&self) -> &[f64] {
        &self.b3
    }

    /// Total number of trainable parameters.
    pub fn parameter_count(&self) -> usize {
        self.w1.len() + self.w2.len() + self.w3.len() + self.b1.len() + self.b2.len() + self.b3.len()
    }

    /// The fixed topology as an ordered list of layer descriptors.
    pub fn layers(&self) -> [LayerSpec; 3] {
        [
            LayerSpec {
                inputs: self.input_size,
                units: self.hidden1_size,
                activation: Activation::Relu,
            },
            LayerSpec {
                inputs: self.hidden1_size,
                units: self.hidden2_size,
                activation: Activation::Relu,
            },
            LayerSpec {
                inputs: self.hidden2_size,
                units: self.output_size,
                activation: Activation::Sigmoid,
            },
        ]
    }

    /// Mutable views of the six parameter groups, in update order.
    pub(crate) fn params_mut(
        &mut self,
    ) -> (
        &mut [f64],
        &mut [f64],
        &mut [f64],
        &mut [f64],
        &mut [f64],
        &mut [f64],
    ) {
        (
            &mut self.w1,
            &mut self.b1,
            &mut self.w2,
            &mut self.b2,
            &mut self.w3,
            &mut self.b3,
        )
    }

    /// Check every declared size and buffer length.
    ///
    /// Deserialized snapshots must pass this before use: zero sizes are an
    /// `InvalidNetwork` error, length disagreements a `ShapeMismatch`.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.input_size == 0
            || self.hidden1_size == 0
            || self.hidden2_size == 0
            || self.output_size == 0
        {
            return Err(NetworkError::InvalidNetwork(format!(
                "layer sizes must be positive, got {}x{}x{}x{}",
                self.input_size, self.hidden1_size, self.hidden2_size, self.output_size
            )));
        }

        let checks: [(&'static str, usize, usize); 6] = [
            ("w1", self.w1.len(), self.input_size * self.hidden1_size),
            ("b1", self.b1.len(), self.hidden1_size),
            ("w2", self.w2.len(), self.hidden1_size * self.hidden2_size),
            ("b2", self.b2.len(), self.hidden2_size),
            ("w3", self.w3.len(), self.hidden2_size * self.output_size),
            ("b3", self.b3.len(), self.output_size),
        ];

        for (what, got, expected) in checks {
            if got != expected {
                return Err(NetworkError::ShapeMismatch {
                    what,
                    expected,
                    got,
                });
            }
        }

        Ok(())
    }

    /// Forward pass through all three layers.
    ///
    /// With `dropout` set, each hidden unit is independently zeroed with
    /// probability [`DROPOUT_RATE`] right after its ReLU and survivors are
    /// scaled by `1/(1-rate)` (inverted dropout). With `None` the pass is
    /// pure and deterministic, which is the inference mode.
    ///
    /// Returns all three layer activations; the hidden ones feed
    /// [`Network::backward`].
    pub fn forward(
        &self,
        input: &[f64],
        mut dropout: Option<&mut SimpleRng>,
    ) -> Result<Activations, NetworkError> {
        if input.len() != self.input_size {
            return Err(NetworkError::ShapeMismatch {
                what: "input",
                expected: self.input_size,
                got: input.len(),
            });
        }

        let mut hidden1 = vec![0.0; self.hidden1_size];
        for i in 0..self.hidden1_size {
            let mut sum = self.b1[i];
            for (j, &value) in input.iter().enumerate() {
                sum += value * self.w1[j * self.hidden1_size + i];
            }
            hidden1[i] = relu(sum);
            if let Some(rng) = dropout.as_deref_mut() {
                if rng.next_f64() < DROPOUT_RATE {
                    hidden1[i] = 0.0;
                } else {
                    hidden1[i] /= 1.0 - DROPOUT_RATE;
                }
            }
        }

        let mut hidden2 = vec![0.0; self.hidden2_size];
        for i in 0..self.hidden2_size {
            let mut sum = self.b2[i];
            for (j, &value) in hidden1.iter().enumerate() {
                sum += value * self.w2[j * self.hidden2_size + i];
            }
            hidden2[i] = relu(sum);
            if let Some(rng) = dropout.as_deref_mut() {
                if rng.next_f64() < DROPOUT_RATE {
                    hidden2[i] = 0.0;
                } else {
                    hidden2[i] /= 1.0 - DROPOUT_RATE;
                }
            }
        }

        let mut output = vec![0.0; self.output_size];
        for i in 0..self.output_size {
            let mut sum = self.b3[i];
            for (j, &value) in hidden2.iter().enumerate() {
                sum += value * self.w3[j * self.output_size + i];
            }
            output[i] = sigmoid(sum);
        }

        Ok(Activations {
            hidden1,
            hidden2,
            output,
        })
    }

    /// Backward pass: per-parameter gradients for one example.
    ///
    /// `input` and `activations` must come from the same forward pass.
    /// The output delta is `prediction - target` (binary cross-entropy
    /// through a sigmoid), hidden deltas chain back through the transposed
    /// weights gated by the ReLU derivative, and every weight gradient adds
    /// the `L2_LAMBDA * weight` penalty term. Bias gradients are the raw
    /// deltas.
    pub fn backward(&self, input: &[f64], target: f64, activations: &Activations) -> Gradients {
        let h1 = self.hidden1_size;
        let h2 = self.hidden2_size;
        let out = self.output_size;

        let mut delta_output = vec![0.0; out];
        for k in 0..out {
            delta_output[k] = activations.output[k] - target;
        }

        let mut delta_hidden2 = vec![0.0; h2];
        for j in 0..h2 {
            let mut sum = 0.0;
            for k in 0..out {
                sum += delta_output[k] * self.w3[j * out + k];
            }
            delta_hidden2[j] = sum * relu_derivative(activations.hidden2[j]);
        }

        let mut delta_hidden1 = vec![0.0; h1];
        for j in 0..h1 {
            let mut sum = 0.0;
            for k in 0..h2 {
                sum += delta_hidden2[k] * self.w2[j * h2 + k];
            }
            delta_hidden1[j] = sum * relu_derivative(activations.hidden1[j]);
        }

        let mut w3_grads = vec![0.0; h2 * out];
        for j in 0..h2 {
            for k in 0..out {
                w3_grads[j * out + k] =
                    delta_output[k] * activations.hidden2[j] + L2_LAMBDA * self.w3[j * out + k];
            }
        }

        let mut w2_grads = vec![0.0; h1 * h2];
        for j in 0..h1 {
            for k in 0..h2 {
                w2_grads[j * h2 + k] =
                    delta_hidden2[k] * activations.hidden1[j] + L2_LAMBDA * self.w2[j * h2 + k];
            }
        }

        let mut w1_grads = vec![0.0; self.input_size * h1];
        for (j, &value) in input.iter().enumerate() {
            for k in 0..h1 {
                w1_grads[j * h1 + k] = delta_hidden1[k] * value + L2_LAMBDA * self.w1[j * h1 + k];
            }
        }

        Gradients {
            w1: w1_grads,
            b1: delta_hidden1,
            w2: w2_grads,
            b2: delta_hidden2,
            w3: w3_grads,
            b3: delta_output,
        }
    }

    /// Classify a raw word, thresholding the output unit at 0.5.
    ///
    /// Non-informative and empty words are "not trending" without running
    /// the network, as is any word the network cannot consume.
    pub fn is_trendy(&self, word: &str) -> bool {
        let normalized = encoding::normalize(word);
        if normalized.is_empty() || encoding::is_non_informative(&normalized) {
            return false;
        }

        let vector = encoding::word_to_vector(&normalized);
        match self.forward(&vector, None) {
            Ok(activations) => activations.output[0] > 0.5,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small_network(seed: u64) -> Network {
        let mut rng = SimpleRng::new(seed);
        Network::new(5, 4, 3, 1, &mut rng)
    }

    #[test]
    fn test_network_creation_shapes() {
        let network = small_network(42);

        assert_eq!(network.w1().len(), 5 * 4);
        assert_eq!(network.b1().len(), 4);
        assert_eq!(network.w2().len(), 4 * 3);
        assert_eq!(network.b2().len(), 3);
        assert_eq!(network.w3().len(), 3 * 1);
        assert_eq!(network.b3().len(), 1);
        assert_eq!(network.parameter_count(), 20 + 12 + 3 + 4 + 3 + 1);
        assert!(network.validate().is_ok());
    }

    #[test]
    fn test_deterministic_initialization() {
        let a = small_network(42);
        let b = small_network(42);

        assert_eq!(a.w1(), b.w1());
        assert_eq!(a.w2(), b.w2());
        assert_eq!(a.w3(), b.w3());
        assert_eq!(a.b1(), b.b1());
    }

    #[test]
    #[should_panic(expected = "layer sizes must be positive")]
    fn test_zero_size_panics() {
        let mut rng = SimpleRng::new(1);
        let _network = Network::new(0, 4, 3, 1, &mut rng);
    }

    #[test]
    fn test_layer_descriptors() {
        let network = small_network(42);
        let layers = network.layers();

        assert_eq!(layers[0].inputs, 5);
        assert_eq!(layers[0].units, 4);
        assert_eq!(layers[0].activation, Activation::Relu);
        assert_eq!(layers[1].inputs, 4);
        assert_eq!(layers[2].units, 1);
        assert_eq!(layers[2].activation, Activation::Sigmoid);
    }

    #[test]
    fn test_forward_dimensions() {
        let network = small_network(42);
        let activations = network.forward(&[0.5; 5], None).unwrap();

        assert_eq!(activations.hidden1.len(), 4);
        assert_eq!(activations.hidden2.len(), 3);
        assert_eq!(activations.output.len(), 1);
        assert!(activations.output[0] > 0.0 && activations.output[0] < 1.0);
    }

    #[test]
    fn test_forward_shape_mismatch() {
        let network = small_network(42);
        let result = network.forward(&[0.5; 4], None);

        assert!(matches!(
            result,
            Err(NetworkError::ShapeMismatch {
                what: "input",
                expected: 5,
                got: 4
            })
        ));
    }

    #[test]
    fn test_forward_without_dropout_is_deterministic() {
        let network = small_network(42);
        let input = [0.1, 0.9, 0.3, 0.0, 0.7];

        let a = network.forward(&input, None).unwrap();
        let b = network.forward(&input, None).unwrap();

        assert_eq!(a.hidden1, b.hidden1);
        assert_eq!(a.hidden2, b.hidden2);
        assert_eq!(a.output, b.output);
    }

    #[test]
    fn test_forward_dropout_deterministic_with_seed() {
        let network = small_network(42);
        let input = [0.1, 0.9, 0.3, 0.0, 0.7];

        let mut rng1 = SimpleRng::new(9);
        let mut rng2 = SimpleRng::new(9);
        let a = network.forward(&input, Some(&mut rng1)).unwrap();
        let b = network.forward(&input, Some(&mut rng2)).unwrap();

        assert_eq!(a.hidden1, b.hidden1);
        assert_eq!(a.output, b.output);
    }

    #[test]
    fn test_dropout_zeroes_and_scales() {
        // A wide layer makes both branches of the dropout draw near certain.
        let mut rng = SimpleRng::new(3);
        let network = Network::new(2, 512, 8, 1, &mut rng);
        let input = [1.0, -0.5];

        let plain = network.forward(&input, None).unwrap();
        let mut dropout_rng = SimpleRng::new(17);
        let dropped = network.forward(&input, Some(&mut dropout_rng)).unwrap();

        let scale = 1.0 / (1.0 - DROPOUT_RATE);
        let mut zeroed = 0usize;
        for (i, &value) in dropped.hidden1.iter().enumerate() {
            if plain.hidden1[i] == 0.0 {
                continue; // unit was already dead under ReLU
            }
            if value == 0.0 {
                zeroed += 1;
            } else {
                assert_relative_eq!(value, plain.hidden1[i] * scale, max_relative = 1e-12);
            }
        }
        assert!(zeroed > 0, "expected at least one unit dropped");
    }

    #[test]
    fn test_backward_shapes() {
        let network = small_network(42);
        let input = [0.1, 0.9, 0.3, 0.0, 0.7];
        let activations = network.forward(&input, None).unwrap();
        let gradients = network.backward(&input, 1.0, &activations);

        assert_eq!(gradients.w1.len(), 5 * 4);
        assert_eq!(gradients.b1.len(), 4);
        assert_eq!(gradients.w2.len(), 4 * 3);
        assert_eq!(gradients.b2.len(), 3);
        assert_eq!(gradients.w3.len(), 3);
        assert_eq!(gradients.b3.len(), 1);
    }

    #[test]
    fn test_backward_output_delta() {
        let network = small_network(42);
        let input = [0.1, 0.9, 0.3, 0.0, 0.7];
        let activations = network.forward(&input, None).unwrap();

        let gradients = network.backward(&input, 1.0, &activations);
        assert_relative_eq!(
            gradients.b3[0],
            activations.output[0] - 1.0,
            max_relative = 1e-12
        );

        let gradients = network.backward(&input, 0.0, &activations);
        assert_relative_eq!(gradients.b3[0], activations.output[0], max_relative = 1e-12);
    }

    // Cross-entropy of the output unit, matching the training loss without
    // the class weight.
    fn bce(predicted: f64, target: f64) -> f64 {
        -(target * (predicted + 1e-10).ln() + (1.0 - target) * (1.0 - predicted + 1e-10).ln())
    }

    #[test]
    fn test_backward_matches_numerical_gradients() {
        let network = small_network(1234);
        let input = [0.3, 0.8, 0.1, 0.6, 0.4];
        let target = 1.0;

        let activations = network.forward(&input, None).unwrap();
        let gradients = network.backward(&input, target, &activations);

        let eps = 1e-6;
        let numeric = |perturb: &dyn Fn(&mut Network, f64)| -> f64 {
            let mut plus = network.clone();
            perturb(&mut plus, eps);
            let loss_plus = bce(plus.forward(&input, None).unwrap().output[0], target);

            let mut minus = network.clone();
            perturb(&mut minus, -eps);
            let loss_minus = bce(minus.forward(&input, None).unwrap().output[0], target);

            (loss_plus - loss_minus) / (2.0 * eps)
        };

        // Weight gradients carry the L2 term on top of the loss gradient.
        for &idx in &[0usize, 7, 13, 19] {
            let expected = numeric(&|n: &mut Network, e: f64| n.w1[idx] += e)
                + L2_LAMBDA * network.w1[idx];
            assert_relative_eq!(gradients.w1[idx], expected, epsilon = 1e-6, max_relative = 1e-4);
        }
        for &idx in &[0usize, 5, 11] {
            let expected = numeric(&|n: &mut Network, e: f64| n.w2[idx] += e)
                + L2_LAMBDA * network.w2[idx];
            assert_relative_eq!(gradients.w2[idx], expected, epsilon = 1e-6, max_relative = 1e-4);
        }
        for idx in 0..3 {
            let expected = numeric(&|n: &mut Network, e: f64| n.w3[idx] += e)
                + L2_LAMBDA * network.w3[idx];
            assert_relative_eq!(gradients.w3[idx], expected, epsilon = 1e-6, max_relative = 1e-4);
        }

        // Bias gradients are the raw deltas.
        for idx in 0..4 {
            let expected = numeric(&|n: &mut Network, e: f64| n.b1[idx] += e);
            assert_relative_eq!(gradients.b1[idx], expected, epsilon = 1e-6, max_relative = 1e-4);
        }
        let expected = numeric(&|n: &mut Network, e: f64| n.b3[0] += e);
        assert_relative_eq!(gradients.b3[0], expected, epsilon = 1e-6, max_relative = 1e-4);
    }

    #[test]
    fn test_is_trendy_rejects_non_informative() {
        let network = Network::new(
            encoding::VECTOR_SIZE,
            8,
            4,
            1,
            &mut SimpleRng::new(42),
        );

        assert!(!network.is_trendy("123"));
        assert!(!network.is_trendy("   "));
        assert!(!network.is_trendy("!?"));
    }

    #[test]
    fn test_is_trendy_shape_incompatible_network() {
        // Input width differs from the encoder's vector width.
        let network = small_network(42);
        assert!(!network.is_trendy("кот"));
    }

    #[test]
    fn test_validate_detects_truncated_bias() {
        let mut network = small_network(42);
        network.b3.pop();

        assert!(matches!(
            network.validate(),
            Err(NetworkError::ShapeMismatch { what: "b3", .. })
        ));
    }
}
