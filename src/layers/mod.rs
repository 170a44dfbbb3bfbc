//! Neural Network Layers
//!
//! The layer stack of the language model, leaves first:
//!
//! - **linear**: Affine projection over the last dimension
//! - **layer_norm**: Per-row normalization with learned scale and shift
//! - **attention**: Scaled dot-product attention, single and multi-head
//! - **feed_forward**: Two-layer position-wise MLP with ReLU
//! - **block**: Pre-norm residual transformer block
//!
//! Every layer is a plain struct that owns its parameters and exposes
//! `forward(&self, x: &Tensor) -> Result<Tensor>` over a single sequence
//! `[seq_len, features]`. The stack shape is fixed at construction time,
//! so layers are composed by aggregation rather than through a trait.

pub mod attention;
pub mod block;
pub mod feed_forward;
pub mod layer_norm;
pub mod linear;

// Re-export main types for convenience
pub use attention::{AttentionHead, MultiHeadAttention};
pub use block::TransformerBlock;
pub use feed_forward::FeedForward;
pub use layer_norm::LayerNorm;
pub use linear::{Init, LinearLayer};
