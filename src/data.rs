//! Text Data Loading
//!
//! Reads a text corpus, splits its token ids into training and validation
//! sets, and draws random batches of `(input, target)` windows.
//!
//! ## How Batches Are Drawn
//!
//! Each row of a batch starts at an independent random offset. The target is
//! the input shifted one position forward, so the model is scored on
//! predicting every next character in the window:
//!
//! ```text
//! Tokens:  [t0, t1, t2, t3, t4, t5, t6, t7, ...]
//! Offset 2, block_size 4:
//!   Input:  [t2, t3, t4, t5]
//!   Target: [t3, t4, t5, t6]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use chargpt::data::{train_val_split, BatchSampler};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let tokens: Vec<usize> = (0..100).map(|i| i % 7).collect();
//! let (train, val) = train_val_split(&tokens, 0.1);
//! assert_eq!((train.len(), val.len()), (90, 10));
//!
//! let sampler = BatchSampler::new(4, 8)?;
//! let mut rng = StdRng::seed_from_u64(0);
//! let (x, y) = sampler.sample(train, &mut rng)?;
//! assert_eq!(x.shape(), &[4, 8]);
//! assert_eq!(y.shape(), &[4, 8]);
//! # Ok::<(), chargpt::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::tensor::Tensor;
use rand::Rng;
use std::fs;
use std::path::Path;

/// Read an entire text file
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    log::info!("Read {} characters from {}", text.chars().count(), path.display());
    Ok(text)
}

/// Split token ids into training and validation sets
///
/// The validation set is the tail of the data, so the two sets never share a
/// window of consecutive text.
///
/// ```rust
/// # use chargpt::data::train_val_split;
/// let tokens = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
/// let (train, val) = train_val_split(&tokens, 0.2);
/// assert_eq!(train.len(), 8);
/// assert_eq!(val.len(), 2);
/// ```
pub fn train_val_split(tokens: &[usize], val_fraction: f32) -> (&[usize], &[usize]) {
    let val_fraction = val_fraction.clamp(0.0, 1.0);
    let split_idx = ((tokens.len() as f32) * (1.0 - val_fraction)).round() as usize;
    let split_idx = split_idx.min(tokens.len());
    (&tokens[..split_idx], &tokens[split_idx..])
}

/// Random batch sampler over a token sequence
#[derive(Clone, Copy, Debug)]
pub struct BatchSampler {
    pub batch_size: usize,
    pub block_size: usize,
}

impl BatchSampler {
    pub fn new(batch_size: usize, block_size: usize) -> Result<Self> {
        if batch_size == 0 || block_size == 0 {
            return Err(Error::config(format!(
                "batch_size ({}) and block_size ({}) must be positive",
                batch_size, block_size
            )));
        }
        Ok(Self {
            batch_size,
            block_size,
        })
    }

    /// Draw one batch of `(inputs, targets)`, both `[batch_size, block_size]`
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if `data` has no more than `block_size` tokens, since
    /// every window needs one extra token for its last target.
    pub fn sample<R: Rng + ?Sized>(&self, data: &[usize], rng: &mut R) -> Result<(Tensor, Tensor)> {
        if data.len() <= self.block_size {
            return Err(Error::shape(format!(
                "need more than {} tokens to draw a batch, got {}",
                self.block_size,
                data.len()
            )));
        }

        let n = self.batch_size * self.block_size;
        let mut inputs = Vec::with_capacity(n);
        let mut targets = Vec::with_capacity(n);

        for _ in 0..self.batch_size {
            let ix = rng.random_range(0..data.len() - self.block_size);
            inputs.extend_from_slice(&data[ix..ix + self.block_size]);
            targets.extend_from_slice(&data[ix + 1..ix + self.block_size + 1]);
        }

        let shape = vec![self.batch_size, self.block_size];
        Ok((
            Tensor::from_indices(&inputs, shape.clone())?,
            Tensor::from_indices(&targets, shape)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    #[test]
    fn test_split_fractions() {
        let tokens: Vec<usize> = (0..10).collect();
        let (train, val) = train_val_split(&tokens, 0.1);
        assert_eq!(train, &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(val, &[9]);

        let (train, val) = train_val_split(&tokens, 0.0);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }

    #[test]
    fn test_targets_are_shifted_inputs() {
        let data: Vec<usize> = (0..50).collect();
        let sampler = BatchSampler::new(8, 5).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let (x, y) = sampler.sample(&data, &mut rng).unwrap();

        for b in 0..8 {
            let xs = x.row(b).unwrap();
            let ys = y.row(b).unwrap();
            for t in 0..5 {
                assert_eq!(ys[t], xs[t] + 1.0);
            }
            assert!(ys[4] < 50.0);
        }
    }

    #[test]
    fn test_minimum_data_length() {
        let sampler = BatchSampler::new(2, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(
            sampler.sample(&[0, 1, 2, 3], &mut rng),
            Err(Error::ShapeMismatch(_))
        ));
        // Exactly one window fits
        let (x, y) = sampler.sample(&[0, 1, 2, 3, 4], &mut rng).unwrap();
        assert_eq!(x.row(1).unwrap(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(y.row(1).unwrap(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        assert!(BatchSampler::new(0, 4).is_err());
        assert!(BatchSampler::new(4, 0).is_err());
    }

    #[test]
    fn test_read_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "It is a truth universally acknowledged").unwrap();
        let text = read_text(file.path()).unwrap();
        assert!(text.starts_with("It is a truth"));

        assert!(matches!(
            read_text("/nonexistent/corpus.txt"),
            Err(Error::Io(_))
        ));
    }
}
