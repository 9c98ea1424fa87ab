//! Chunking options.

use super::Tokenizer;
use crate::error::{Error, Result};

/// Where the token budget for a chunk comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSizeSource {
    /// A fixed configured budget
    Fixed(usize),
    /// The embedding model's maximum sequence length, as reported by
    /// the tokenizer
    ModelMax,
}

/// Options for splitting markdown into retrieval chunks.
#[derive(Debug, Clone)]
pub struct ChunkOptions {
    /// Token budget source; the safety penalty is subtracted from it
    pub size_source: ChunkSizeSource,

    /// Safety penalty subtracted from the budget, leaving headroom for
    /// special tokens added by the embedding model
    pub size_penalty: usize,

    /// Fraction of the budget repeated as trailing-token overlap at the
    /// start of the next chunk
    pub overlap_percent: f32,

    /// Prefix each chunk with its `## {chapter}` heading before indexing
    pub add_section_titles: bool,
}

impl ChunkOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed token budget.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.size_source = ChunkSizeSource::Fixed(size);
        self
    }

    /// Use the embedding model's maximum sequence length as the budget.
    pub fn with_model_max(mut self) -> Self {
        self.size_source = ChunkSizeSource::ModelMax;
        self
    }

    /// Set the safety penalty.
    pub fn with_size_penalty(mut self, penalty: usize) -> Self {
        self.size_penalty = penalty;
        self
    }

    /// Set the overlap fraction (0.0..1.0).
    pub fn with_overlap_percent(mut self, percent: f32) -> Self {
        self.overlap_percent = percent.clamp(0.0, 1.0);
        self
    }

    /// Enable or disable chapter-title prefix injection.
    pub fn with_section_titles(mut self, add: bool) -> Self {
        self.add_section_titles = add;
        self
    }

    /// Resolve the effective chunk size against a tokenizer.
    pub fn resolve_chunk_size(&self, tokenizer: &dyn Tokenizer) -> Result<usize> {
        let base = match self.size_source {
            ChunkSizeSource::Fixed(size) => size,
            ChunkSizeSource::ModelMax => tokenizer.max_sequence_length().ok_or_else(|| {
                Error::TokenizerUnavailable(
                    "tokenizer reports no maximum sequence length".to_string(),
                )
            })?,
        };
        if base <= self.size_penalty {
            return Err(Error::Other(format!(
                "chunk size {} does not exceed the safety penalty {}",
                base, self.size_penalty
            )));
        }
        Ok(base - self.size_penalty)
    }
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            size_source: ChunkSizeSource::Fixed(512),
            size_penalty: 32,
            overlap_percent: 0.1,
            add_section_titles: false,
        }
    }
}
