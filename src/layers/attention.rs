//! Self-Attention
//!
//! ## Scaled Dot-Product Attention (one head)
//!
//! ```text
//! Q, K, V = x @ W_q, x @ W_k, x @ W_v        [seq, head_size]
//! scores  = (Q @ K^T) / √head_size           [seq, seq]
//! weights = softmax(scores, last axis)
//! output  = weights @ V                      [seq, head_size]
//! ```
//!
//! ## Multi-Head Attention
//!
//! Every head sees the same input and produces a `[seq, head_size]` result.
//! The results are concatenated along the embedding axis back to
//! `[seq, n_embd]` and passed through an output projection. Heads are
//! independent, so they run in parallel; each head's arithmetic is unchanged
//! by that, and the output is deterministic.
//!
//! ## Causal Masking
//!
//! Each head carries a `[block_size, block_size]` mask marking future
//! positions. When causal masking is enabled, scores at those positions are
//! set to -inf before the softmax so position `i` only attends to `0..=i`.
//! The mask is not applied by default: the reference configuration attends
//! bidirectionally, and turning masking on is an explicit choice made in
//! [`crate::Config`].

use super::linear::{Init, LinearLayer};
use crate::error::{Error, Result};
use crate::tensor::Tensor;
use rayon::prelude::*;

/// One attention head
#[derive(Clone, Debug)]
pub struct AttentionHead {
    pub key: LinearLayer,
    pub query: LinearLayer,
    pub value: LinearLayer,
    /// `[block_size, block_size]`, 1.0 where the column is in the future
    pub future_mask: Tensor,
    pub head_size: usize,
    pub causal: bool,
}

impl AttentionHead {
    pub fn new(
        n_embd: usize,
        head_size: usize,
        block_size: usize,
        causal: bool,
        init: Init,
    ) -> Result<Self> {
        Ok(Self {
            key: LinearLayer::new(n_embd, head_size, init.offset(0))?,
            query: LinearLayer::new(n_embd, head_size, init.offset(1))?,
            value: LinearLayer::new(n_embd, head_size, init.offset(2))?,
            future_mask: future_mask(block_size)?,
            head_size,
            causal,
        })
    }

    /// Forward pass for one head
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor [seq_len, n_embd]
    ///
    /// # Returns
    ///
    /// Head output [seq_len, head_size]
    pub fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let k = self.key.forward(x)?;
        let q = self.query.forward(x)?;

        let mut wei = q.matmul(&k.transpose()?)?;
        wei.scale(1.0 / (self.head_size as f32).sqrt());

        if self.causal {
            let seq_len = wei.shape()[0];
            wei = wei.masked_fill(&self.mask_for(seq_len)?, f32::NEG_INFINITY)?;
        }

        wei.softmax_in_place(1)?;

        let v = self.value.forward(x)?;
        wei.matmul(&v)
    }

    /// Top-left `[seq_len, seq_len]` corner of the stored mask
    fn mask_for(&self, seq_len: usize) -> Result<Tensor> {
        let block_size = self.future_mask.shape()[0];
        if seq_len > block_size {
            return Err(Error::shape(format!(
                "sequence length {} exceeds mask size {}",
                seq_len, block_size
            )));
        }
        let mut data = Vec::with_capacity(seq_len * seq_len);
        for i in 0..seq_len {
            data.extend_from_slice(&self.future_mask.row(i)?[..seq_len]);
        }
        Tensor::new(data, vec![seq_len, seq_len])
    }

    pub fn num_parameters(&self) -> usize {
        self.key.num_parameters() + self.query.num_parameters() + self.value.num_parameters()
    }
}

/// Mask with 1.0 strictly above the diagonal
///
/// For size 4:
/// ```text
/// [0 1 1 1]
/// [0 0 1 1]
/// [0 0 0 1]
/// [0 0 0 0]
/// ```
fn future_mask(size: usize) -> Result<Tensor> {
    let mut mask = Tensor::zeros(&[size, size])?;
    let data = mask.data_mut();
    for i in 0..size {
        for j in i + 1..size {
            data[i * size + j] = 1.0;
        }
    }
    Ok(mask)
}

/// Multi-head self-attention with output projection
#[derive(Clone, Debug)]
pub struct MultiHeadAttention {
    pub heads: Vec<AttentionHead>,
    pub proj: LinearLayer,
}

impl MultiHeadAttention {
    /// Create `n_heads` heads of size `n_embd / n_heads`
    ///
    /// # Errors
    ///
    /// `Configuration` if `n_heads` is zero or does not divide `n_embd`.
    pub fn new(
        n_embd: usize,
        n_heads: usize,
        block_size: usize,
        causal: bool,
        init: Init,
    ) -> Result<Self> {
        if n_heads == 0 || n_embd % n_heads != 0 {
            return Err(Error::config(format!(
                "n_embd ({}) must be divisible by n_heads ({})",
                n_embd, n_heads
            )));
        }
        let head_size = n_embd / n_heads;

        let heads = (0..n_heads)
            .map(|h| {
                AttentionHead::new(
                    n_embd,
                    head_size,
                    block_size,
                    causal,
                    init.offset(10 + h as u64),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            heads,
            proj: LinearLayer::new(n_embd, n_embd, init.offset(1))?,
        })
    }

    pub fn n_heads(&self) -> usize {
        self.heads.len()
    }

    /// Forward pass: run each head, concatenate, project
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor [seq_len, n_embd]
    ///
    /// # Returns
    ///
    /// Output tensor [seq_len, n_embd]
    pub fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let head_outputs = self
            .heads
            .par_iter()
            .map(|head| head.forward(x))
            .collect::<Result<Vec<_>>>()?;

        let concatenated = Tensor::concatenate(&head_outputs, x.ndim() - 1)?;
        self.proj.forward(&concatenated)
    }

    pub fn num_parameters(&self) -> usize {
        self.heads
            .iter()
            .map(AttentionHead::num_parameters)
            .sum::<usize>()
            + self.proj.num_parameters()
    }
}
