//! Transformer Block
//!
//! Pre-norm residual composition of attention and feed-forward:
//!
//! ```text
//! x → LayerNorm → MultiHeadAttention → (+) → LayerNorm → FeedForward → (+) → output
//! │                                     ↑                              ↑
//! └─────────────────────────────────────┘                              │
//!                                       └──────────────────────────────┘
//! ```
//!
//! Inputs are a single sequence `[seq_len, n_embd]`; batches are handled by
//! the model, one sequence at a time.

use super::attention::MultiHeadAttention;
use super::feed_forward::FeedForward;
use super::layer_norm::LayerNorm;
use super::linear::Init;
use crate::error::Result;
use crate::tensor::Tensor;

/// Transformer block combining attention and feed-forward with residuals
#[derive(Clone, Debug)]
pub struct TransformerBlock {
    pub ln1: LayerNorm,
    pub attn: MultiHeadAttention,
    pub ln2: LayerNorm,
    pub ffwd: FeedForward,
}

impl TransformerBlock {
    pub fn new(
        n_embd: usize,
        n_heads: usize,
        block_size: usize,
        causal: bool,
        init: Init,
    ) -> Result<Self> {
        Ok(Self {
            ln1: LayerNorm::new(n_embd)?,
            attn: MultiHeadAttention::new(n_embd, n_heads, block_size, causal, init.offset(0))?,
            ln2: LayerNorm::new(n_embd)?,
            ffwd: FeedForward::new(n_embd, init.offset(1))?,
        })
    }

    /// Forward pass
    ///
    /// `x1 = x + attn(ln1(x))`, then `x1 + ffwd(ln2(x1))`
    pub fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let x1 = x.add(&self.attn.forward(&self.ln1.forward(x)?)?)?;
        x1.add(&self.ffwd.forward(&self.ln2.forward(&x1)?)?)
    }

    pub fn num_parameters(&self) -> usize {
        self.ln1.num_parameters()
            + self.attn.num_parameters()
            + self.ln2.num_parameters()
            + self.ffwd.num_parameters()
    }
}
