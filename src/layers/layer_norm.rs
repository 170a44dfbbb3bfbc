//! Layer Normalization
//!
//! Normalizes each row of a `[rows, features]` tensor to zero mean and unit
//! variance, then applies a learned scale (gamma) and shift (beta).
//!
//! ## Forward Pass
//!
//! ```text
//! 1. mean = sum(x) / F
//! 2. var  = sum(x²) / F - mean²
//! 3. y    = (x - mean) / √(var + ε) · γ + β
//! ```
//!
//! The variance uses the sum-of-squares identity rather than the two-pass
//! centered formula. Both sums are accumulated in a single sweep over the
//! row, and the floating-point results depend on that ordering. For rows
//! that are constant (up to rounding) the identity can come out slightly
//! negative, so it is clamped at zero before `ε` is added.

use crate::error::{Error, Result};
use crate::tensor::Tensor;
use rayon::prelude::*;

/// Default epsilon added to the variance
pub const DEFAULT_EPS: f32 = 1e-5;

/// Layer normalization layer
#[derive(Clone, Debug)]
pub struct LayerNorm {
    pub gamma: Tensor, // Scale parameter [normalized_shape]
    pub beta: Tensor,  // Shift parameter [normalized_shape]
    pub eps: f32,
}

impl LayerNorm {
    /// Create a layer norm with gamma = 1, beta = 0 and the default epsilon
    pub fn new(normalized_shape: usize) -> Result<Self> {
        Self::with_eps(normalized_shape, DEFAULT_EPS)
    }

    pub fn with_eps(normalized_shape: usize, eps: f32) -> Result<Self> {
        if normalized_shape == 0 {
            return Err(Error::config("layer norm needs a positive feature size"));
        }
        Ok(Self {
            gamma: Tensor::new(vec![1.0; normalized_shape], vec![normalized_shape])?,
            beta: Tensor::new(vec![0.0; normalized_shape], vec![normalized_shape])?,
            eps,
        })
    }

    /// Forward pass over a 2D input, one row at a time
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the input is not rank 2 or its width differs from
    /// the normalized shape.
    pub fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let (_, features) = x.dims2("layer norm")?;
        if features != self.gamma.len() {
            return Err(Error::shape(format!(
                "layer norm expects {} features, got {}",
                self.gamma.len(),
                features
            )));
        }

        let gamma = self.gamma.data();
        let beta = self.beta.data();
        let n = features as f32;
        let eps = self.eps;

        // Rows are independent; each row's reductions stay sequential.
        let out: Vec<f32> = x
            .data()
            .par_chunks(features)
            .flat_map_iter(move |row| {
                let mut sum = 0.0f32;
                let mut sum_sq = 0.0f32;
                for &v in row {
                    sum += v;
                    sum_sq += v * v;
                }
                let mean = sum / n;
                let variance = (sum_sq / n - mean * mean).max(0.0);
                let std = (variance + eps).sqrt();

                row.iter()
                    .zip(gamma.iter().zip(beta))
                    .map(move |(&v, (&g, &b))| (v - mean) / std * g + b)
            })
            .collect();

        Tensor::new(out, x.shape().to_vec())
    }

    pub fn num_parameters(&self) -> usize {
        self.gamma.len() + self.beta.len()
    }
}
