//! Narrow interfaces over the external collaborators.
//!
//! The relational store, vector store, embedding models, tokenizer, and
//! answer generator are all injected capabilities; the pipeline never
//! hard-wires a specific engine.

use crate::chunk::{Chunk, Tokenizer};
use crate::error::Result;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Loads the embedding model's tokenizer.
///
/// Loading happens once at startup; `force_refresh` asks the provider to
/// bypass any local cache and re-fetch.
pub trait TokenizerProvider {
    /// Load the tokenizer, optionally bypassing local caches.
    fn load(&self, force_refresh: bool) -> Result<Box<dyn Tokenizer>>;
}

/// Load a tokenizer, retrying once with a forced re-fetch before giving
/// up. Failure here is fatal for the process, not per-document.
pub fn load_tokenizer(provider: &dyn TokenizerProvider) -> Result<Box<dyn Tokenizer>> {
    match provider.load(false) {
        Ok(tokenizer) => Ok(tokenizer),
        Err(err) => {
            log::warn!("tokenizer load failed ({}); retrying with forced re-fetch", err);
            provider.load(true)
        }
    }
}

/// Relational store for paper rows, the paper-info unit, and chunk rows.
pub trait PaperStore: Send + Sync {
    /// Whether a paper with this id was already ingested.
    fn exists(&self, paper_id: &str) -> Result<bool>;

    /// Insert the paper row.
    fn insert_paper(&self, paper_id: &str, filename: &str) -> Result<()>;

    /// Persist the paper-info unit, keyed by paper id.
    fn insert_paper_info(&self, paper_id: &str, content: &str) -> Result<()>;

    /// Persist a chunk row, keyed by the chunk id.
    fn insert_chunk(&self, chunk: &Chunk) -> Result<()>;

    /// Delete a paper and everything keyed by it.
    fn delete_paper(&self, paper_id: &str) -> Result<()>;

    /// List ingested paper ids.
    fn list_papers(&self) -> Result<Vec<String>>;
}

/// Payload stored next to a vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorPayload {
    /// Structured metadata (chunk metadata or image metadata)
    pub metadata: serde_json::Value,
    /// Text content the vector was produced from
    pub content: String,
}

/// A search result from the vector store.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Stored point id
    pub id: Uuid,
    /// Similarity score
    pub score: f32,
    /// Stored payload
    pub payload: VectorPayload,
}

/// Vector store surface: upserts by id, searches filtered to one paper.
pub trait VectorIndex: Send + Sync {
    /// Insert or replace a point.
    fn upsert(&self, id: Uuid, vector: Vec<f32>, payload: VectorPayload) -> Result<()>;

    /// Search the index, restricted to one paper.
    fn search(&self, query: &str, k: usize, paper_id: &str) -> Result<Vec<SearchHit>>;
}

/// Text embedding model.
pub trait TextEmbedder: Send + Sync {
    /// Embed a text into a dense vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Image embedding model, used for figure chunks only.
pub trait ImageEmbedder: Send + Sync {
    /// Embed an image into a dense vector.
    fn embed(&self, image: &RgbaImage) -> Result<Vec<f32>>;
}

/// Prompt-to-text generation, the seam used by downstream answerers.
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a prompt.
    fn generate(&self, prompt: &str) -> Result<String>;
}
