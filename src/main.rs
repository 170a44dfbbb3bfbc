//! Character-level transformer driver
//!
//! Reads a corpus, builds the character vocabulary, constructs the model,
//! runs the forward-only evaluation loop and finally prints generated text.
//!
//! ## Usage
//!
//! ```bash
//! # Reference hyperparameters (384 wide, 6 heads, 6 layers, context 128)
//! cargo run --release -- --data pride_and_prejudice.txt
//!
//! # Smaller model, seeded sampling, metrics to CSV
//! cargo run --release -- --embd 64 --heads 4 --layers 2 --context 32 \
//!     --iters 20 --seed 42 --log-csv metrics.csv
//!
//! # Load hyperparameters from JSON (vocab_size is taken from the corpus)
//! cargo run --release -- --config model.json --causal
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use chargpt::data::{read_text, train_val_split};
use chargpt::eval::{run, EvalConfig, MetricsLogger};
use chargpt::{Config, LanguageModel, Result, Vocabulary};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::fs;

#[derive(Parser)]
#[command(
    name = "chargpt",
    about = "Character-level transformer: forward-only evaluation and text generation"
)]
struct Args {
    /// Path to training text file
    #[arg(long, default_value = "pride_and_prejudice.txt")]
    data: String,

    /// JSON file with `model` and/or `eval` sections
    #[arg(long)]
    config: Option<String>,

    // Model architecture (override the reference preset or the config file)
    /// Embedding dimension
    #[arg(long)]
    embd: Option<usize>,

    /// Number of attention heads
    #[arg(long)]
    heads: Option<usize>,

    /// Number of transformer layers
    #[arg(long)]
    layers: Option<usize>,

    /// Context window length (block_size)
    #[arg(long)]
    context: Option<usize>,

    /// Mask future positions in attention
    #[arg(long)]
    causal: bool,

    // Loop parameters
    /// Number of forward iterations
    #[arg(long)]
    iters: Option<usize>,

    /// Sequences per batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Write evaluation metrics to this CSV file
    #[arg(long)]
    log_csv: Option<String>,

    // Generation
    /// Seed for batch sampling and generation (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Text the generated continuation starts from
    #[arg(long, default_value = "The ")]
    prompt: String,

    /// Number of characters to generate
    #[arg(long, default_value = "100")]
    max_new_tokens: usize,
}

/// Layout of the `--config` JSON file
#[derive(Deserialize, Default)]
#[serde(default)]
struct FileConfig {
    model: Option<Config>,
    eval: EvalConfig,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = try_main(Args::parse()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn try_main(args: Args) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => serde_json::from_str::<FileConfig>(&fs::read_to_string(path)?)?,
        None => FileConfig::default(),
    };

    let text = read_text(&args.data)?;
    let vocab = Vocabulary::build(&text)?;
    log::info!("Vocabulary size: {}", vocab.len());

    let mut config = file_config
        .model
        .unwrap_or_else(|| Config::reference(vocab.len()));
    if config.vocab_size != vocab.len() {
        log::warn!(
            "Config vocab_size {} replaced by corpus vocabulary size {}",
            config.vocab_size,
            vocab.len()
        );
        config.vocab_size = vocab.len();
    }
    config.n_embd = args.embd.unwrap_or(config.n_embd);
    config.n_heads = args.heads.unwrap_or(config.n_heads);
    config.n_layers = args.layers.unwrap_or(config.n_layers);
    config.block_size = args.context.unwrap_or(config.block_size);
    config.causal |= args.causal;

    let mut eval_config = file_config.eval;
    eval_config.max_iters = args.iters.unwrap_or(eval_config.max_iters);
    eval_config.batch_size = args.batch_size.unwrap_or(eval_config.batch_size);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let tokens = vocab.encode(&text)?;
    let (train, val) = train_val_split(&tokens, eval_config.val_fraction);
    log::info!("Split {} tokens: {} train, {} val", tokens.len(), train.len(), val.len());

    let model = LanguageModel::new(&config)?;

    let mut logger = args.log_csv.as_deref().map(MetricsLogger::new).transpose()?;
    let report = run(&model, train, val, &eval_config, &mut rng, logger.as_mut())?;
    if let Some(loss) = report.last_loss {
        log::info!("Final batch loss: {:.4}", loss);
    }

    let generated = model.generate(&vocab, &args.prompt, args.max_new_tokens, &mut rng)?;
    println!("\nGenerated Text:\n{}", generated);
    Ok(())
}
