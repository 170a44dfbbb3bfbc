//! Character-Level Language Model
//!
//! ## Architecture Overview
//!
//! ```text
//! Token ids [T]
//!     ↓
//! Token embedding row + position embedding row   [T, n_embd]
//!     ↓
//! Transformer block 1 … N                        [T, n_embd]
//!     ↓
//! Final layer norm
//!     ↓
//! Linear head                                    [T, vocab_size]
//! ```
//!
//! ## Batches
//!
//! [`LanguageModel::forward`] accepts either a single sequence `[T]` or a
//! batch `[B, T]`. Each sequence runs through the rank-2 pipeline on its own
//! and the logits are stacked row-wise into `[B·T, vocab_size]`, which lines
//! up with targets flattened to `[B·T]` for [`cross_entropy_loss`].
//!
//! ## Inference Only
//!
//! There is no backward pass. Parameters are fixed at construction, either
//! to constants or to seeded normal draws (see [`Init`]).
//!
//! ## Example
//!
//! ```rust
//! use chargpt::{Config, LanguageModel, Tensor};
//!
//! let config = Config { n_layers: 1, n_heads: 2, n_embd: 8, block_size: 4, ..Config::tiny(4) };
//! let model = LanguageModel::new(&config)?;
//!
//! let idx = Tensor::from_indices(&[0, 1, 2, 3], vec![1, 4])?;
//! let logits = model.forward(&idx)?;
//! assert_eq!(logits.shape(), &[4, 4]);
//! # Ok::<(), chargpt::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::layers::linear::sample_normal;
use crate::layers::{Init, LayerNorm, LinearLayer, TransformerBlock};
use crate::sampling::sample_from_probs;
use crate::tensor::Tensor;
use crate::vocab::Vocabulary;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Model configuration
///
/// # Fields
///
/// - `vocab_size`: Number of distinct symbols
/// - `n_embd`: Embedding width
/// - `n_heads`: Attention heads per block (must divide `n_embd`)
/// - `n_layers`: Number of transformer blocks
/// - `block_size`: Maximum context length
/// - `causal`: Mask future positions in attention
/// - `init`: Parameter initialization strategy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub vocab_size: usize,
    pub n_embd: usize,
    pub n_heads: usize,
    pub n_layers: usize,
    pub block_size: usize,
    #[serde(default)]
    pub causal: bool,
    #[serde(default)]
    pub init: Init,
}

impl Config {
    /// The reference hyperparameters: 384-wide, 6 heads, 6 layers, context 128,
    /// constant weights and bidirectional attention
    pub fn reference(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            n_embd: 384,
            n_heads: 6,
            n_layers: 6,
            block_size: 128,
            causal: false,
            init: Init::default(),
        }
    }

    /// Small model for quick experiments and tests
    pub fn tiny(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            n_embd: 32,
            n_heads: 4,
            n_layers: 2,
            block_size: 32,
            causal: false,
            init: Init::default(),
        }
    }

    /// Check dimensions before any allocation
    ///
    /// # Errors
    ///
    /// `Configuration` for zero dimensions or a head count that does not
    /// divide the embedding width.
    pub fn validate(&self) -> Result<()> {
        let dims = [
            ("vocab_size", self.vocab_size),
            ("n_embd", self.n_embd),
            ("n_heads", self.n_heads),
            ("n_layers", self.n_layers),
            ("block_size", self.block_size),
        ];
        if let Some((name, _)) = dims.iter().find(|(_, v)| *v == 0) {
            return Err(Error::config(format!("{} must be positive", name)));
        }
        if self.n_embd % self.n_heads != 0 {
            return Err(Error::config(format!(
                "n_embd ({}) must be divisible by n_heads ({})",
                self.n_embd, self.n_heads
            )));
        }
        Ok(())
    }

    pub fn head_size(&self) -> usize {
        self.n_embd / self.n_heads
    }
}

/// Autoregressive character-level transformer
#[derive(Clone, Debug)]
pub struct LanguageModel {
    pub config: Config,
    /// [vocab_size, n_embd]
    pub token_embedding: Tensor,
    /// [block_size, n_embd]
    pub position_embedding: Tensor,
    pub blocks: Vec<TransformerBlock>,
    pub ln_f: LayerNorm,
    pub lm_head: LinearLayer,
}

impl LanguageModel {
    /// Build a model from a validated configuration
    ///
    /// Embedding tables start at zero under constant init and are drawn from
    /// the seeded normal distribution otherwise.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let init = config.init;

        let token_embedding = embedding_table(config.vocab_size, config.n_embd, init.offset(1))?;
        let position_embedding =
            embedding_table(config.block_size, config.n_embd, init.offset(2))?;

        let blocks = (0..config.n_layers)
            .map(|i| {
                TransformerBlock::new(
                    config.n_embd,
                    config.n_heads,
                    config.block_size,
                    config.causal,
                    init.offset(100 + i as u64),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let model = Self {
            config: config.clone(),
            token_embedding,
            position_embedding,
            blocks,
            ln_f: LayerNorm::new(config.n_embd)?,
            lm_head: LinearLayer::new(config.n_embd, config.vocab_size, init.offset(3))?,
        };

        log::info!(
            "Built model: {} layers, {} heads, n_embd {}, block_size {}, {} parameters",
            config.n_layers,
            config.n_heads,
            config.n_embd,
            config.block_size,
            model.count_parameters()
        );
        Ok(model)
    }

    /// Forward pass: token ids → logits
    ///
    /// # Arguments
    ///
    /// * `idx` - Token ids stored as floats, shape `[T]` or `[B, T]`
    ///
    /// # Returns
    ///
    /// Logits `[B·T, vocab_size]` (with `B = 1` for a rank-1 input)
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` for other ranks or `T > block_size`
    /// - `Index` for ids that are negative, fractional or `>= vocab_size`
    pub fn forward(&self, idx: &Tensor) -> Result<Tensor> {
        let seq_len = match idx.shape() {
            &[t] | &[_, t] => t,
            other => {
                return Err(Error::shape(format!(
                    "token ids must be [T] or [B, T], got {:?}",
                    other
                )))
            }
        };

        let ids = idx
            .data()
            .iter()
            .map(|&v| self.token_id(v))
            .collect::<Result<Vec<_>>>()?;

        let mut logits = Vec::with_capacity(ids.len() * self.config.vocab_size);
        for seq in ids.chunks(seq_len) {
            logits.extend(self.forward_ids(seq)?.into_data());
        }
        Tensor::new(logits, vec![ids.len(), self.config.vocab_size])
    }

    /// Forward pass over one sequence of ids, returning `[T, vocab_size]`
    pub fn forward_ids(&self, ids: &[usize]) -> Result<Tensor> {
        let mut x = self.embed(ids)?;
        for block in &self.blocks {
            x = block.forward(&x)?;
        }
        let x = self.ln_f.forward(&x)?;
        self.lm_head.forward(&x)
    }

    /// Sum of token and position embedding rows, `[T, n_embd]`
    fn embed(&self, ids: &[usize]) -> Result<Tensor> {
        let seq_len = ids.len();
        if seq_len == 0 || seq_len > self.config.block_size {
            return Err(Error::shape(format!(
                "sequence length {} must be in 1..={} (crop the context first)",
                seq_len, self.config.block_size
            )));
        }

        let n_embd = self.config.n_embd;
        let mut x = Vec::with_capacity(seq_len * n_embd);
        for (pos, &id) in ids.iter().enumerate() {
            if id >= self.config.vocab_size {
                return Err(Error::index(format!(
                    "token id {} out of vocab range (vocab_size = {})",
                    id, self.config.vocab_size
                )));
            }
            let tok = self.token_embedding.row(id)?;
            let pos_row = self.position_embedding.row(pos)?;
            x.extend(tok.iter().zip(pos_row).map(|(a, b)| a + b));
        }
        Tensor::new(x, vec![seq_len, n_embd])
    }

    fn token_id(&self, v: f32) -> Result<usize> {
        if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v as usize >= self.config.vocab_size
        {
            return Err(Error::index(format!(
                "invalid token id {} (vocab_size = {})",
                v, self.config.vocab_size
            )));
        }
        Ok(v as usize)
    }

    /// Generate text one token at a time
    ///
    /// Encodes `start_text`, then `max_new_tokens` times: crops the context to
    /// the last `block_size` tokens, runs the model, turns the final
    /// position's logits into probabilities and samples the next token from
    /// `rng`. Returns the decoded seed plus generated text.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the vocabulary size differs from the model's
    /// - `UnknownSymbol` if the seed contains unseen characters
    /// - `ShapeMismatch` if the seed is empty and tokens are requested
    /// - `NumericAnomaly` if the final-position logits are not finite
    pub fn generate<R: Rng + ?Sized>(
        &self,
        vocab: &Vocabulary,
        start_text: &str,
        max_new_tokens: usize,
        rng: &mut R,
    ) -> Result<String> {
        if vocab.len() != self.config.vocab_size {
            return Err(Error::config(format!(
                "vocabulary has {} symbols but the model expects {}",
                vocab.len(),
                self.config.vocab_size
            )));
        }

        let mut tokens = vocab.encode(start_text)?;
        if tokens.is_empty() && max_new_tokens > 0 {
            return Err(Error::shape("generation needs a non-empty seed text"));
        }

        for step in 0..max_new_tokens {
            let start = tokens.len().saturating_sub(self.config.block_size);
            let logits = self.forward_ids(&tokens[start..])?;

            let last = logits.row(logits.shape()[0] - 1)?;
            let mut probs = Tensor::new(last.to_vec(), vec![1, last.len()])?;
            probs.softmax_in_place(1)?;
            if !probs.all_finite() {
                return Err(Error::NumericAnomaly(format!(
                    "non-finite next-token probabilities at generation step {}",
                    step
                )));
            }

            let next = sample_from_probs(probs.data(), rng);
            log::debug!("generate step {}: sampled token {}", step, next);
            tokens.push(next);
        }

        vocab.decode(&tokens)
    }

    /// Count total number of parameters
    pub fn count_parameters(&self) -> usize {
        self.token_embedding.len()
            + self.position_embedding.len()
            + self
                .blocks
                .iter()
                .map(TransformerBlock::num_parameters)
                .sum::<usize>()
            + self.ln_f.num_parameters()
            + self.lm_head.num_parameters()
    }
}

fn embedding_table(rows: usize, n_embd: usize, init: Init) -> Result<Tensor> {
    match init {
        Init::Constant { .. } => Tensor::zeros(&[rows, n_embd]),
        Init::Normal { std, seed } => {
            Tensor::new(sample_normal(rows * n_embd, std, seed)?, vec![rows, n_embd])
        }
    }
}

/// Mean cross-entropy between logits rows and target class ids
///
/// For each row: `-log_softmax(logits)[target]`, using the max-subtraction
/// trick, averaged over rows.
///
/// # Arguments
///
/// * `logits` - `[N, vocab_size]`
/// * `targets` - `[N]`, class ids stored as floats
///
/// # Errors
///
/// - `ShapeMismatch` for wrong ranks or differing row counts
/// - `Index` for a target outside `0..vocab_size`
/// - `NumericAnomaly` if logits or the resulting loss are not finite
pub fn cross_entropy_loss(logits: &Tensor, targets: &Tensor) -> Result<f32> {
    let (rows, vocab_size) = logits.dims2("cross_entropy_loss logits")?;
    if targets.ndim() != 1 {
        return Err(Error::shape(format!(
            "cross_entropy_loss targets must be rank 1, got {:?}",
            targets.shape()
        )));
    }
    if targets.len() != rows {
        return Err(Error::shape(format!(
            "logits have {} rows but there are {} targets",
            rows,
            targets.len()
        )));
    }
    if !logits.all_finite() {
        return Err(Error::NumericAnomaly(
            "non-finite logits reached cross_entropy_loss".into(),
        ));
    }

    let mut total_loss = 0.0f32;
    for (i, &t) in targets.data().iter().enumerate() {
        if !t.is_finite() || t < 0.0 || t.fract() != 0.0 || t as usize >= vocab_size {
            return Err(Error::index(format!(
                "target {} out of range for {} classes",
                t, vocab_size
            )));
        }
        let row = logits.row(i)?;
        let max_logit = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let sum_exp: f32 = row.iter().map(|&x| (x - max_logit).exp()).sum();
        let log_prob = (row[t as usize] - max_logit) - sum_exp.ln();
        total_loss -= log_prob;
    }

    let loss = total_loss / rows as f32;
    if !loss.is_finite() {
        return Err(Error::NumericAnomaly(format!("loss is {}", loss)));
    }
    Ok(loss)
}
