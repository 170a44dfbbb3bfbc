//! Character-Level Vocabulary
//!
//! The vocabulary is the sorted set of distinct characters found in the
//! training text. Each character's position in that sorted list is its
//! token id, so ids are contiguous in `0..vocab_size`.
//!
//! ## Example
//!
//! ```rust
//! use chargpt::Vocabulary;
//!
//! let vocab = Vocabulary::build("hello world")?;
//! assert_eq!(vocab.len(), 8); // ' ', d, e, h, l, o, r, w
//!
//! let ids = vocab.encode("hello")?;
//! assert_eq!(vocab.decode(&ids)?, "hello");
//! # Ok::<(), chargpt::Error>(())
//! ```

use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap};

/// Sorted character set with id lookup in both directions
#[derive(Clone, Debug)]
pub struct Vocabulary {
    chars: Vec<char>,
    ids: HashMap<char, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from every distinct character in `text`
    ///
    /// # Errors
    ///
    /// `Configuration` if `text` is empty.
    pub fn build(text: &str) -> Result<Self> {
        let chars: Vec<char> = text.chars().collect::<BTreeSet<_>>().into_iter().collect();
        if chars.is_empty() {
            return Err(Error::config("cannot build a vocabulary from empty text"));
        }
        let ids = chars.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Ok(Self { chars, ids })
    }

    /// Number of distinct symbols
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false for a successfully built vocabulary
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Symbols in id order
    pub fn symbols(&self) -> &[char] {
        &self.chars
    }

    /// Encode text to token ids
    ///
    /// # Errors
    ///
    /// `UnknownSymbol` for a character not seen when the vocabulary was built.
    pub fn encode(&self, text: &str) -> Result<Vec<usize>> {
        text.chars()
            .map(|c| self.ids.get(&c).copied().ok_or(Error::UnknownSymbol(c)))
            .collect()
    }

    /// Decode token ids back to text
    ///
    /// # Errors
    ///
    /// `Index` for an id outside `0..len()`.
    pub fn decode(&self, ids: &[usize]) -> Result<String> {
        ids.iter()
            .map(|&id| {
                self.chars.get(id).copied().ok_or_else(|| {
                    Error::index(format!(
                        "token id {} out of vocabulary range (size {})",
                        id,
                        self.chars.len()
                    ))
                })
            })
            .collect()
    }
}
