//! Markdown chunking and chunk-graph linking.

mod linker;
mod options;
mod splitter;

pub use linker::{Chunk, ChunkLinker, ChunkMetadata};
pub use options::{ChunkOptions, ChunkSizeSource};
pub use splitter::{split_headers, MarkdownSegment, TokenSplitter, Tokenizer};

use crate::error::Result;

/// A markdown document split into retrieval chunks.
#[derive(Debug, Clone)]
pub struct SplitDocument {
    /// The pre-first-heading block (title/authors/abstract/keywords),
    /// persisted separately and never part of the chunk chain
    pub paper_info: String,
    /// Linked chunks in document order
    pub chunks: Vec<Chunk>,
}

/// Split a markdown document into linked, metadata-enriched chunks.
///
/// Header-delimited segments are sub-split to the tokenizer budget, then
/// enriched with chapter/figure-reference metadata and prev/next links.
pub fn split_and_link(
    markdown: &str,
    paper_id: &str,
    tokenizer: &dyn Tokenizer,
    options: &ChunkOptions,
) -> Result<SplitDocument> {
    let (paper_info, segments) = split_headers(markdown);

    let chunk_size = options.resolve_chunk_size(tokenizer)?;
    let chunk_overlap = (chunk_size as f32 * options.overlap_percent) as usize;
    log::debug!(
        "chunking with size {} and overlap {}",
        chunk_size,
        chunk_overlap
    );

    let splitter = TokenSplitter::new(chunk_size, chunk_overlap);
    let mut pieces: Vec<MarkdownSegment> = Vec::new();
    for segment in segments {
        for content in splitter.split(&segment.content, tokenizer) {
            pieces.push(MarkdownSegment {
                chapter: segment.chapter.clone(),
                content,
            });
        }
    }

    let linker = ChunkLinker::new();
    let mut chunks = linker.link(paper_id, pieces);

    if options.add_section_titles {
        for chunk in &mut chunks {
            if let Some(ref chapter) = chunk.metadata.chapter {
                chunk.content = format!("## {}\n{}", chapter, chunk.content);
            }
        }
    }

    log::info!("split markdown into {} chunk(s)", chunks.len());
    Ok(SplitDocument { paper_info, chunks })
}
