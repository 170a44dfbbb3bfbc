//! Position-wise Feed-Forward Network
//!
//! A two-layer MLP applied to every position independently:
//!
//! ```text
//! x → Linear(n_embd → 4·n_embd) → ReLU → Linear(4·n_embd → n_embd) → y
//! ```

use super::linear::{Init, LinearLayer};
use crate::error::Result;
use crate::tensor::Tensor;

/// Hidden width multiplier
pub const EXPANSION: usize = 4;

/// Feed-forward network with ReLU activation
#[derive(Clone, Debug)]
pub struct FeedForward {
    pub layer1: LinearLayer,
    pub layer2: LinearLayer,
}

impl FeedForward {
    pub fn new(n_embd: usize, init: Init) -> Result<Self> {
        let hidden = EXPANSION * n_embd;
        Ok(Self {
            layer1: LinearLayer::new(n_embd, hidden, init.offset(0))?,
            layer2: LinearLayer::new(hidden, n_embd, init.offset(1))?,
        })
    }

    /// Forward pass: expand → ReLU → project
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor [seq_len, n_embd]
    pub fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let hidden = self.layer1.forward(x)?.relu();
        self.layer2.forward(&hidden)
    }

    pub fn num_parameters(&self) -> usize {
        self.layer1.num_parameters() + self.layer2.num_parameters()
    }
}
