//! End-to-end paper ingestion.
//!
//! One call takes a document from file bytes to stored chunks: hash the
//! content into a paper id, check for a duplicate, run the layout
//! oracle, assemble markdown, split and link chunks, embed and upsert
//! everything, and save figure images to disk. A storage failure rolls
//! the paper row back (best effort) so a retry is possible; the
//! existence check is deliberately not transactional.

use crate::assemble::{extract_document_figures, DocumentAssembler, ImageRecord};
use crate::chunk::{split_and_link, ChunkLinker, ChunkOptions, Tokenizer};
use crate::error::{Error, Result};
use crate::ingest::{ImageEmbedder, PaperStore, TextEmbedder, VectorIndex, VectorPayload};
use crate::layout::{DocumentLayout, LayoutOracle};
use crate::render::{to_markdown, PaperInfo};
use md5::{Digest, Md5};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Content-hash identity of a paper: lowercase MD5 hex of the file
/// bytes.
pub fn paper_id_for(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Options for the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Root directory for saved figure images; a per-paper subdirectory
    /// is created under it
    pub image_dir: PathBuf,

    /// Chunking options
    pub chunk: ChunkOptions,
}

impl IngestOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the figure image root directory.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = dir.into();
        self
    }

    /// Set the chunking options.
    pub fn with_chunk_options(mut self, chunk: ChunkOptions) -> Self {
        self.chunk = chunk;
        self
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("storage/images"),
            chunk: ChunkOptions::default(),
        }
    }
}

/// Result of one ingestion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The paper was processed and stored.
    Ingested {
        /// Assigned paper id
        paper_id: String,
        /// Number of linked chunks stored
        chunk_count: usize,
        /// Number of figure images stored
        figure_count: usize,
    },
    /// The paper already exists; nothing was written.
    Duplicate {
        /// Existing paper id
        paper_id: String,
    },
}

/// The ingestion pipeline with its injected capabilities.
pub struct Ingestor {
    oracle: Arc<dyn LayoutOracle + Send + Sync>,
    store: Arc<dyn PaperStore>,
    index: Arc<dyn VectorIndex>,
    text_embedder: Arc<dyn TextEmbedder>,
    image_embedder: Arc<dyn ImageEmbedder>,
    tokenizer: Arc<dyn Tokenizer>,
    options: IngestOptions,
}

impl Ingestor {
    /// Create an ingestor from its capabilities.
    pub fn new(
        oracle: Arc<dyn LayoutOracle + Send + Sync>,
        store: Arc<dyn PaperStore>,
        index: Arc<dyn VectorIndex>,
        text_embedder: Arc<dyn TextEmbedder>,
        image_embedder: Arc<dyn ImageEmbedder>,
        tokenizer: Arc<dyn Tokenizer>,
        options: IngestOptions,
    ) -> Self {
        Self {
            oracle,
            store,
            index,
            text_embedder,
            image_embedder,
            tokenizer,
            options,
        }
    }

    /// Ingest one document file.
    ///
    /// A duplicate paper is a no-op outcome, not an error. After the
    /// paper row is inserted, any failure deletes it again (best
    /// effort) before the error propagates.
    pub fn ingest(&self, path: &Path) -> Result<IngestOutcome> {
        let bytes = fs::read(path)?;
        let paper_id = paper_id_for(&bytes);
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.store.exists(&paper_id)? {
            log::info!("paper {} already ingested; skipping", paper_id);
            return Ok(IngestOutcome::Duplicate { paper_id });
        }
        self.store.insert_paper(&paper_id, &filename)?;
        log::info!("ingesting paper {} ({})", paper_id, filename);

        match self.process(path, &paper_id) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if let Err(rollback_err) = self.store.delete_paper(&paper_id) {
                    log::warn!(
                        "rollback of paper {} failed: {}",
                        paper_id,
                        rollback_err
                    );
                }
                Err(err)
            }
        }
    }

    fn process(&self, path: &Path, paper_id: &str) -> Result<IngestOutcome> {
        let layout = self.oracle.analyze(path)?;
        validate_layout(&layout)?;

        let body = DocumentAssembler::new().assemble(&layout);
        let paper_info = PaperInfo::from_layout(&layout);
        let figures = extract_document_figures(&layout)?;
        let markdown = to_markdown(&paper_info, &body.rows);

        let split = split_and_link(
            &markdown,
            paper_id,
            self.tokenizer.as_ref(),
            &self.options.chunk,
        )?;

        self.store.insert_paper_info(paper_id, &split.paper_info)?;
        for chunk in &split.chunks {
            self.store.insert_chunk(chunk)?;
            let vector = self.text_embedder.embed(&chunk.content)?;
            self.index.upsert(
                chunk.id,
                vector,
                VectorPayload {
                    metadata: serde_json::to_value(&chunk.metadata)
                        .map_err(|e| Error::Storage(e.to_string()))?,
                    content: chunk.content.clone(),
                },
            )?;
        }

        let figure_count = figures.len();
        self.store_figures(paper_id, &figures)?;

        Ok(IngestOutcome::Ingested {
            paper_id: paper_id.to_string(),
            chunk_count: split.chunks.len(),
            figure_count,
        })
    }

    /// Save figure images under `{image_dir}/{paper_id}/` and upsert one
    /// image point per figure, with the caption as searchable content.
    fn store_figures(&self, paper_id: &str, figures: &[ImageRecord]) -> Result<()> {
        if figures.is_empty() {
            return Ok(());
        }
        let dir = self.options.image_dir.join(paper_id);
        fs::create_dir_all(&dir)?;

        let linker = ChunkLinker::new();
        for record in figures {
            let file_name = format!("fig_{}_{}.png", record.page_index, record.figure_index);
            let image_path = dir.join(&file_name);
            record.image.save(&image_path)?;

            let fig_ref_id = record
                .caption
                .as_deref()
                .and_then(|c| linker.figure_refs(c).into_iter().next());
            let metadata = json!({
                "paper_id": paper_id,
                "caption": record.caption,
                "page_id": record.page_index,
                "fig_id": record.figure_index,
                "path": image_path.to_string_lossy(),
                "fig_ref_id": fig_ref_id,
            });

            let vector = self.image_embedder.embed(&record.image)?;
            self.index.upsert(
                Uuid::new_v4(),
                vector,
                VectorPayload {
                    metadata,
                    content: record.caption.clone().unwrap_or_default(),
                },
            )?;
        }
        Ok(())
    }
}

/// Reject layouts the pipeline cannot work with: an empty page set, or
/// pages with no rendered rasters at all.
fn validate_layout(layout: &DocumentLayout) -> Result<()> {
    if layout.is_empty() {
        return Err(Error::MalformedLayout(
            "oracle produced an empty page set".to_string(),
        ));
    }
    if layout.pages.iter().all(|p| p.raster.is_none()) {
        return Err(Error::MalformedLayout(
            "oracle produced no page rasters".to_string(),
        ));
    }
    Ok(())
}
