//! Evaluation Loop and Metrics Logging
//!
//! The model has no backward pass, so "training" here is a forward-only loop:
//! each iteration draws a random batch, runs the model and scores the logits
//! with cross-entropy. Every `eval_interval` steps the loop estimates the
//! mean loss on both the training and validation sets and records it.
//!
//! ## CSV Format
//!
//! [`MetricsLogger`] writes one row per evaluation:
//! - `step`: Iteration number
//! - `elapsed_seconds`: Time since the logger was created
//! - `train_loss`, `val_loss`: Mean cross-entropy
//! - `train_perplexity`, `val_perplexity`: `exp(loss)`
//!
//! The validation columns are left empty when the validation set is too
//! short to hold a single window.
//!
//! ## Perplexity
//!
//! ```text
//! perplexity = exp(loss)
//! ```
//!
//! A model that spreads probability uniformly over `V` characters has
//! perplexity `V`. Under constant initialization every column of the output
//! head is identical, so each row of logits is flat and the loss is `ln V`
//! whatever the input.

use crate::data::BatchSampler;
use crate::error::{Error, Result};
use crate::model::{cross_entropy_loss, LanguageModel};
use crate::tensor::Tensor;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Loop hyperparameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Sequences per batch
    pub batch_size: usize,
    /// Forward passes to run
    pub max_iters: usize,
    /// Estimate losses every N steps
    pub eval_interval: usize,
    /// Batches averaged per loss estimate
    pub eval_iters: usize,
    /// Tail fraction of the data held out for validation
    pub val_fraction: f32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            batch_size: 64,
            max_iters: 100,
            eval_interval: 10,
            eval_iters: 5,
            val_fraction: 0.1,
        }
    }
}

impl EvalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.eval_interval == 0 || self.eval_iters == 0 {
            return Err(Error::config(
                "batch_size, eval_interval and eval_iters must be positive",
            ));
        }
        if !(0.0..1.0).contains(&self.val_fraction) {
            return Err(Error::config(format!(
                "val_fraction must be in [0, 1), got {}",
                self.val_fraction
            )));
        }
        Ok(())
    }
}

/// Losses recorded at one evaluation step
#[derive(Clone, Debug, PartialEq)]
pub struct EvalPoint {
    pub step: usize,
    pub train_loss: f32,
    pub val_loss: Option<f32>,
}

/// Summary of a finished run
#[derive(Clone, Debug, Default)]
pub struct EvalReport {
    pub evaluations: Vec<EvalPoint>,
    /// Loss of the last batch forward pass
    pub last_loss: Option<f32>,
}

/// Cross-entropy of one `[B, T]` batch against its `[B, T]` targets
pub fn batch_loss(model: &LanguageModel, inputs: &Tensor, targets: &Tensor) -> Result<f32> {
    let logits = model.forward(inputs)?;
    let flat_targets = targets.reshape(&[targets.len()])?;
    cross_entropy_loss(&logits, &flat_targets)
}

/// Mean loss over `eval_iters` random batches of `data`
pub fn estimate_loss<R: Rng + ?Sized>(
    model: &LanguageModel,
    data: &[usize],
    sampler: &BatchSampler,
    eval_iters: usize,
    rng: &mut R,
) -> Result<f32> {
    if eval_iters == 0 {
        return Err(Error::config("eval_iters must be positive"));
    }
    let mut total = 0.0;
    for _ in 0..eval_iters {
        let (x, y) = sampler.sample(data, rng)?;
        total += batch_loss(model, &x, &y)?;
    }
    Ok(total / eval_iters as f32)
}

/// Run the forward-only loop
///
/// Performs `max_iters` batch forward passes on `train`. At every multiple
/// of `eval_interval` the train and validation losses are estimated, logged
/// and, if a logger is given, appended to its CSV. A validation set too short
/// for one window is skipped rather than failing the run.
pub fn run<R: Rng + ?Sized>(
    model: &LanguageModel,
    train: &[usize],
    val: &[usize],
    cfg: &EvalConfig,
    rng: &mut R,
    mut logger: Option<&mut MetricsLogger>,
) -> Result<EvalReport> {
    cfg.validate()?;
    let sampler = BatchSampler::new(cfg.batch_size, model.config.block_size)?;
    let val_usable = val.len() > sampler.block_size;
    if !val_usable {
        log::warn!(
            "Validation set has {} tokens, need more than {}; skipping validation loss",
            val.len(),
            sampler.block_size
        );
    }

    log::info!(
        "Starting forward-only loop: {} iterations, batch {}x{}",
        cfg.max_iters,
        cfg.batch_size,
        sampler.block_size
    );

    let mut report = EvalReport::default();
    for iter in 0..cfg.max_iters {
        if iter % cfg.eval_interval == 0 {
            let train_loss = estimate_loss(model, train, &sampler, cfg.eval_iters, rng)?;
            let val_loss = if val_usable {
                Some(estimate_loss(model, val, &sampler, cfg.eval_iters, rng)?)
            } else {
                None
            };

            match val_loss {
                Some(v) => log::info!("Step {:4} | train {:.4} | val {:.4}", iter, train_loss, v),
                None => log::info!("Step {:4} | train {:.4}", iter, train_loss),
            }
            if let Some(logger) = logger.as_deref_mut() {
                logger.log(iter, train_loss, val_loss)?;
            }
            report.evaluations.push(EvalPoint {
                step: iter,
                train_loss,
                val_loss,
            });
        }

        let (x, y) = sampler.sample(train, rng)?;
        let loss = batch_loss(model, &x, &y)?;
        log::debug!("iter {}: loss {:.4}", iter, loss);
        report.last_loss = Some(loss);
    }

    log::info!("Forward-only loop finished");
    Ok(report)
}

/// CSV logger for evaluation metrics
///
/// Each row is flushed as soon as it is written.
pub struct MetricsLogger {
    log_file: File,
    start_time: Instant,
}

impl MetricsLogger {
    /// Create the CSV file and write its header
    pub fn new<P: AsRef<Path>>(log_path: P) -> Result<Self> {
        let mut log_file = File::create(log_path)?;
        writeln!(
            log_file,
            "step,elapsed_seconds,train_loss,val_loss,train_perplexity,val_perplexity"
        )?;
        Ok(Self {
            log_file,
            start_time: Instant::now(),
        })
    }

    /// Append one evaluation row
    pub fn log(&mut self, step: usize, train_loss: f32, val_loss: Option<f32>) -> Result<()> {
        let elapsed = self.start_time.elapsed().as_secs_f32();
        let (val, val_ppl) = match val_loss {
            Some(v) => (format!("{:.4}", v), format!("{:.2}", v.exp())),
            None => (String::new(), String::new()),
        };

        writeln!(
            self.log_file,
            "{},{:.2},{:.4},{},{:.2},{}",
            step,
            elapsed,
            train_loss,
            val,
            train_loss.exp(),
            val_ppl
        )?;
        self.log_file.flush()?;
        Ok(())
    }
}
