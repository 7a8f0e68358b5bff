//! Adam (Adaptive Moment Estimation) optimizer
//!
//! Maintains first and second moment estimates for every parameter of the
//! network, one buffer per parameter group, plus a single global step
//! counter used for bias correction. One [`Adam::step`] consumes the
//! gradients of one training example and updates all six groups under the
//! same step count.
//!
//! The update rule per parameter is:
//!
//! ```text
//! m = β1 * m + (1 - β1) * g
//! v = β2 * v + (1 - β2) * g²
//! θ -= α * (m / (1 - β1^t)) / (sqrt(v / (1 - β2^t)) + ε)
//! ```

use crate::network::{Gradients, Network};

/// Exponential decay rate for first moment estimates.
pub const BETA1: f64 = 0.9;

/// Exponential decay rate for second moment estimates.
pub const BETA2: f64 = 0.999;

/// Numerical stability constant in the denominator.
pub const EPSILON: f64 = 1e-8;

/// Adam optimizer state for one training run.
///
/// Allocated zeroed against a concrete network, advanced once per sample,
/// and discarded when the run ends; moments are never persisted.
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    /// Global step counter for bias correction, one tick per sample update.
    t: u64,
    m_w1: Vec<f64>,
    v_w1: Vec<f64>,
    m_b1: Vec<f64>,
    v_b1: Vec<f64>,
    m_w2: Vec<f64>,
    v_w2: Vec<f64>,
    m_b2: Vec<f64>,
    v_b2: Vec<f64>,
    m_w3: Vec<f64>,
    v_w3: Vec<f64>,
    m_b3: Vec<f64>,
    v_b3: Vec<f64>,
}

impl Adam {
    /// Create zero-initialized optimizer state shaped like `network`.
    pub fn new(network: &Network, learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: BETA1,
            beta2: BETA2,
            epsilon: EPSILON,
            t: 0,
            m_w1: vec![0.0; network.w1().len()],
            v_w1: vec![0.0; network.w1().len()],
            m_b1: vec![0.0; network.b1().len()],
            v_b1: vec![0.0; network.b1().len()],
            m_w2: vec![0.0; network.w2().len()],
            v_w2: vec![0.0; network.w2().len()],
            m_b2: vec![0.0; network.b2().len()],
            v_b2: vec![0.0; network.b2().len()],
            m_w3: vec![0.0; network.w3().len()],
            v_w3: vec![0.0; network.w3().len()],
            m_b3: vec![0.0; network.b3().len()],
            v_b3: vec![0.0; network.b3().len()],
        }
    }

    /// Apply one sample's gradients to every parameter of the network.
    ///
    /// Advances the global step counter once; all six parameter groups see
    /// the same bias-corrected step.
    ///
    /// # Panics
    ///
    /// Panics if the gradient buffers do not match the network's shapes.
    pub fn step(&mut self, network: &mut Network, gradients: &Gradients) {
        self.t += 1;

        let bias_correction1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t as i32);

        let (w1, b1, w2, b2, w3, b3) = network.params_mut();

        Self::update_group(
            &mut self.m_w1,
            &mut self.v_w1,
            w1,
            &gradients.w1,
            self.learning_rate,
            self.beta1,
            self.beta2,
            self.epsilon,
            bias_correction1,
            bias_correction2,
        );
        Self::update_group(
            &mut self.m_b1,
            &mut self.v_b1,
            b1,
            &gradients.b1,
            self.learning_rate,
            self.beta1,
            self.beta2,
            self.epsilon,
            bias_correction1,
            bias_correction2,
        );
        Self::update_group(
            &mut self.m_w2,
            &mut self.v_w2,
            w2,
            &gradients.w2,
            self.learning_rate,
            self.beta1,
            self.beta2,
            self.epsilon,
            bias_correction1,
            bias_correction2,
        );
        Self::update_group(
            &mut self.m_b2,
            &mut self.v_b2,
            b2,
            &gradients.b2,
            self.learning_rate,
            self.beta1,
            self.beta2,
            self.epsilon,
            bias_correction1,
            bias_correction2,
        );
        Self::update_group(
            &mut self.m_w3,
            &mut self.v_w3,
            w3,
            &gradients.w3,
            self.learning_rate,
            self.beta1,
            self.beta2,
            self.epsilon,
            bias_correction1,
            bias_correction2,
        );
        Self::update_group(
            &mut self.m_b3,
            &mut self.v_b3,
            b3,
            &gradients.b3,
            self.learning_rate,
            self.beta1,
            self.beta2,
            self.epsilon,
            bias_correction1,
            bias_correction2,
        );
    }

    /// Adam update for one parameter group.
    #[allow(clippy::too_many_arguments)]
    fn update_group(
        m: &mut [f64],
        v: &mut [f64],
        parameters: &mut [f64],
        gradients: &[f64],
        learning_rate: f64,
        beta1: f64,
        beta2: f64,
        epsilon: f64,
        bias_correction1: f64,
        bias_correction2: f64,
    ) {
        assert_eq!(
            parameters.len(),
            gradients.len(),
            "Parameters and gradients must have the same length"
        );

        for i in 0..parameters.len() {
            // Update biased first moment estimate
            m[i] = beta1 * m[i] + (1.0 - beta1) * gradients[i];

            // Update biased second raw moment estimate
            v[i] = beta2 * v[i] + (1.0 - beta2) * gradients[i] * gradients[i];

            // Compute bias-corrected estimates
            let m_hat = m[i] / bias_correction1;
            let v_hat = v[i] / bias_correction2;

            parameters[i] -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
        }
    }

    /// Get the base learning rate.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Number of sample updates applied so far.
    pub fn step_count(&self) -> u64 {
        self.t
    }
}
