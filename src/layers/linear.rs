//! Linear Layer (Fully Connected)
//!
//! Performs an affine transformation over the last dimension: `y = x @ W + b`
//!
//! ```text
//! Input:  x [seq_len, in_features]
//! Weight: W [in_features, out_features]
//! Bias:   b [out_features]
//! Output: y [seq_len, out_features]
//! ```
//!
//! ## Initialization
//!
//! Weights come from an [`Init`] strategy. The constant strategy fills every
//! weight with `0.1` and every bias with `0.01`, which makes runs exactly
//! reproducible. The normal strategy draws from a seeded `N(0, std)` so
//! different layers get different (but still reproducible) weights.

use crate::error::{Error, Result};
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Parameter initialization strategy
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Init {
    /// Every weight gets `weight`, every bias gets `bias`
    Constant { weight: f32, bias: f32 },
    /// Weights from `N(0, std)` seeded per layer, biases zero
    Normal { std: f32, seed: u64 },
}

impl Default for Init {
    fn default() -> Self {
        Init::Constant {
            weight: 0.1,
            bias: 0.01,
        }
    }
}

impl Init {
    /// Derive the strategy for a sub-component
    ///
    /// The child seed is a draw from the parent seed's generator XORed with
    /// `salt`. Children of one parent therefore have distinct seeds whenever
    /// their salts differ.
    pub fn offset(self, salt: u64) -> Self {
        match self {
            Init::Normal { std, seed } => Init::Normal {
                std,
                seed: StdRng::seed_from_u64(seed).random::<u64>() ^ salt,
            },
            constant => constant,
        }
    }

    /// Draw `size` weight values
    pub(crate) fn weights(self, size: usize) -> Result<Vec<f32>> {
        match self {
            Init::Constant { weight, .. } => Ok(vec![weight; size]),
            Init::Normal { std, seed } => sample_normal(size, std, seed),
        }
    }

    /// Bias values for `size` outputs
    pub(crate) fn biases(self, size: usize) -> Vec<f32> {
        match self {
            Init::Constant { bias, .. } => vec![bias; size],
            Init::Normal { .. } => vec![0.0; size],
        }
    }
}

/// Seeded draws from `N(0, std)`
pub(crate) fn sample_normal(size: usize, std: f32, seed: u64) -> Result<Vec<f32>> {
    let normal = Normal::new(0.0, std)
        .map_err(|e| Error::config(format!("invalid init std {}: {}", std, e)))?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..size).map(|_| normal.sample(&mut rng)).collect())
}

/// Linear layer (fully connected)
#[derive(Clone, Debug)]
pub struct LinearLayer {
    /// Weight matrix: [in_features, out_features]
    pub weight: Tensor,
    /// Bias vector: [out_features]
    pub bias: Tensor,
}

impl LinearLayer {
    /// Create a new linear layer
    ///
    /// # Errors
    ///
    /// `Configuration` if either feature count is zero or the init is invalid.
    pub fn new(in_features: usize, out_features: usize, init: Init) -> Result<Self> {
        if in_features == 0 || out_features == 0 {
            return Err(Error::config(format!(
                "linear layer needs positive features, got {} -> {}",
                in_features, out_features
            )));
        }
        Ok(Self {
            weight: Tensor::new(
                init.weights(in_features * out_features)?,
                vec![in_features, out_features],
            )?,
            bias: Tensor::new(init.biases(out_features), vec![out_features])?,
        })
    }

    pub fn in_features(&self) -> usize {
        self.weight.shape()[0]
    }

    pub fn out_features(&self) -> usize {
        self.weight.shape()[1]
    }

    /// Forward pass: `y = x @ W + b`, bias broadcast across rows
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` unless `x` is `[rows, in_features]`.
    pub fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let (_, cols) = x.dims2("linear layer")?;
        if cols != self.in_features() {
            return Err(Error::shape(format!(
                "linear layer expects {} input features, got {}",
                self.in_features(),
                cols
            )));
        }
        x.matmul(&self.weight)?.add_row_broadcast(&self.bias)
    }

    pub fn num_parameters(&self) -> usize {
        self.weight.len() + self.bias.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_init_forward() {
        let layer = LinearLayer::new(3, 2, Init::default()).unwrap();
        let x = Tensor::new(vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0], vec![2, 3]).unwrap();
        let y = layer.forward(&x).unwrap();

        assert_eq!(y.shape(), &[2, 2]);
        // 0.1 * (1 + 2 + 3) + 0.01
        assert!((y.get(&[0, 0]).unwrap() - 0.61).abs() < 1e-6);
        assert!((y.get(&[1, 1]).unwrap() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_forward_rejects_wrong_width() {
        let layer = LinearLayer::new(4, 2, Init::default()).unwrap();
        let x = Tensor::zeros(&[2, 3]).unwrap();
        assert!(matches!(layer.forward(&x), Err(Error::ShapeMismatch(_))));

        let x3 = Tensor::zeros(&[1, 2, 4]).unwrap();
        assert!(matches!(layer.forward(&x3), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn test_normal_init_is_seeded() {
        let init = Init::Normal { std: 0.02, seed: 7 };
        let a = LinearLayer::new(8, 8, init).unwrap();
        let b = LinearLayer::new(8, 8, init).unwrap();
        let c = LinearLayer::new(8, 8, init.offset(1)).unwrap();

        assert_eq!(a.weight, b.weight);
        assert_ne!(a.weight, c.weight);
        assert!(a.bias.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_offset_siblings_never_collide() {
        let parent = Init::Normal { std: 0.02, seed: 42 };
        let seeds: std::collections::HashSet<u64> = (0..256u64)
            .map(|salt| match parent.offset(salt) {
                Init::Normal { seed, .. } => seed,
                Init::Constant { .. } => unreachable!(),
            })
            .collect();
        assert_eq!(seeds.len(), 256);
        assert_eq!(parent.offset(3), parent.offset(3));
        assert_eq!(Init::default().offset(5), Init::default());
    }

    #[test]
    fn test_zero_features_rejected() {
        assert!(matches!(
            LinearLayer::new(0, 4, Init::default()),
            Err(Error::Configuration(_))
        ));
    }
}
