//! Chargpt: Character-Level Transformer Language Model
//!
//! A decoder-style transformer over individual characters, built on a small
//! strided tensor engine. Models are constructed with fixed (constant or
//! seeded) parameters and run forward only: they score batches with
//! cross-entropy and generate text by sampling one character at a time.
//!
//! # Modules
//!
//! - [`tensor`] - Row-major tensor with matmul, softmax and friends
//! - [`layers`] - Linear, layer norm, attention, feed-forward, transformer block
//! - [`model`] - Model configuration, forward pass, loss and generation
//! - [`vocab`] - Character vocabulary with encode/decode
//! - [`sampling`] - Sampling from a probability row
//! - [`data`] - Corpus loading, train/validation split, random batches
//! - [`eval`] - Forward-only evaluation loop and CSV metrics
//! - [`error`] - Error taxonomy shared by every module
//!
//! # Example
//!
//! ```rust
//! use chargpt::{Config, LanguageModel, Vocabulary};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let vocab = Vocabulary::build("the quick brown fox")?;
//! let config = Config { n_embd: 16, n_heads: 2, n_layers: 1, block_size: 8, ..Config::tiny(vocab.len()) };
//! let model = LanguageModel::new(&config)?;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let text = model.generate(&vocab, "the ", 20, &mut rng)?;
//! assert_eq!(text.chars().count(), 24);
//! # Ok::<(), chargpt::Error>(())
//! ```

pub mod data;
pub mod error;
pub mod eval;
pub mod layers;
pub mod model;
pub mod sampling;
pub mod tensor;
pub mod vocab;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use eval::{EvalConfig, MetricsLogger};
pub use layers::{
    AttentionHead, FeedForward, Init, LayerNorm, LinearLayer, MultiHeadAttention,
    TransformerBlock,
};
pub use model::{cross_entropy_loss, Config, LanguageModel};
pub use sampling::sample_from_probs;
pub use tensor::Tensor;
pub use vocab::Vocabulary;
