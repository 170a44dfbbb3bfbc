//! Token Sampling
//!
//! Inverse-CDF sampling from a probability row: draw `r ~ U[0, 1)` and pick
//! the first index whose cumulative probability reaches `r`.
//!
//! The random source is always passed in by the caller. Seeding a
//! `StdRng` makes generation reproducible:
//!
//! ```rust
//! use chargpt::sampling::sample_from_probs;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let idx = sample_from_probs(&[0.0, 1.0, 0.0], &mut rng);
//! assert_eq!(idx, 1);
//! ```

use rand::Rng;

/// Sample an index from a probability distribution
///
/// If rounding leaves the cumulative sum just below `r`, the last index
/// with non-zero probability is returned.
pub fn sample_from_probs<R: Rng + ?Sized>(probs: &[f32], rng: &mut R) -> usize {
    let r: f32 = rng.random();
    sample_with(probs, r)
}

/// Inverse-CDF lookup for a given uniform draw `r`
pub fn sample_with(probs: &[f32], r: f32) -> usize {
    let mut cumsum = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        cumsum += p;
        if r <= cumsum && p > 0.0 {
            return i;
        }
    }
    probs.iter().rposition(|&p| p > 0.0).unwrap_or(0)
}
