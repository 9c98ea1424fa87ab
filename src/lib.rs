//! # papermill
//!
//! Structuring and chunk-linking pipeline for scientific papers.
//!
//! An external layout oracle turns a PDF into typed regions (title,
//! authors, sections, figures, text rows); papermill turns that layout
//! into an ordered, de-duplicated, hyphenation-aware markdown document,
//! extracts figure images with their captions, and splits the markdown
//! into retrieval chunks linked into a doubly linked chain with chapter
//! and figure-reference metadata.
//!
//! ## Quick Start
//!
//! ```no_run
//! use papermill::{structure_layout, chunk::{split_and_link, ChunkOptions, Tokenizer}};
//! use papermill::layout::DocumentLayout;
//!
//! # struct WordTokenizer;
//! # impl Tokenizer for WordTokenizer {
//! #     fn count_tokens(&self, text: &str) -> usize { text.split_whitespace().count() }
//! #     fn max_sequence_length(&self) -> Option<usize> { Some(512) }
//! # }
//! fn main() -> papermill::Result<()> {
//!     let layout: DocumentLayout = serde_json::from_str(
//!         &std::fs::read_to_string("layout.json")?,
//!     )?;
//!
//!     // Assemble the body and render markdown
//!     let paper = structure_layout(&layout)?;
//!     let markdown = paper.markdown();
//!
//!     // Split into linked retrieval chunks
//!     let split = split_and_link(&markdown, "paper-id", &WordTokenizer, &ChunkOptions::default())?;
//!     println!("{} chunks", split.chunks.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Components
//!
//! - **geometry**: box overlap, asymmetric extension, pixel conversion
//! - **layout**: oracle types and front-matter/clutter classification
//! - **assemble**: body state machine, hyphenation merge, figure crops
//! - **render**: canonical markdown serialization
//! - **chunk**: header + token-budget splitting, chunk-chain linking
//! - **ingest**: storage/embedding capabilities and the full pipeline

pub mod assemble;
pub mod chunk;
pub mod error;
pub mod geometry;
pub mod ingest;
pub mod layout;
pub mod render;

pub use assemble::{AssembledBody, DocumentAssembler, ImageRecord, RowKind, TypedRow};
pub use chunk::{Chunk, ChunkMetadata, ChunkOptions, SplitDocument, Tokenizer};
pub use error::{Error, Result};
pub use geometry::{BoundingBox, PixelBox};
pub use ingest::{IngestOptions, IngestOutcome, Ingestor};
pub use layout::{DocumentLayout, Entity, EntityKind, LayoutOracle, PageLayout};
pub use render::PaperInfo;

use assemble::extract_document_figures;

/// A fully structured paper: front matter, ordered body rows, and
/// extracted figures.
pub struct StructuredPaper {
    /// Front-matter text from the first page
    pub paper_info: PaperInfo,
    /// Assembled body rows plus the references side list
    pub body: AssembledBody,
    /// Extracted figure images with captions
    pub figures: Vec<ImageRecord>,
}

impl StructuredPaper {
    /// Render the canonical markdown document.
    pub fn markdown(&self) -> String {
        render::to_markdown(&self.paper_info, &self.body.rows)
    }
}

/// Structure an oracle layout into body rows, front matter, and figures.
///
/// Fails with [`Error::MalformedLayout`] on an empty page set; figures
/// on pages without rasters are skipped rather than extracted.
pub fn structure_layout(layout: &DocumentLayout) -> Result<StructuredPaper> {
    if layout.is_empty() {
        return Err(Error::MalformedLayout(
            "layout has no pages".to_string(),
        ));
    }
    let body = DocumentAssembler::new().assemble(layout);
    let paper_info = PaperInfo::from_layout(layout);
    let figures = extract_document_figures(layout)?;
    Ok(StructuredPaper {
        paper_info,
        body,
        figures,
    })
}

/// Structure a layout and render its markdown in one call.
pub fn layout_to_markdown(layout: &DocumentLayout) -> Result<String> {
    Ok(structure_layout(layout)?.markdown())
}
