//! Chunk metadata enrichment and chain linking.

use super::MarkdownSegment;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived metadata attached to a chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Owning paper identity (content hash)
    pub paper_id: String,

    /// Chapter heading the chunk came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,

    /// Leading section number of the chapter, e.g. "3.2"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,

    /// Figure numbers referenced in the chunk body
    pub fig_ref_ids: Vec<String>,

    /// Previous chunk in the chain; unset on the first chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_id: Option<Uuid>,

    /// Next chunk in the chain; unset on the last chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<Uuid>,
}

/// A retrieval chunk with identity and chain metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk identity, assigned at creation
    pub id: Uuid,
    /// Markdown body
    pub content: String,
    /// Derived metadata
    pub metadata: ChunkMetadata,
}

/// Turns split segments into identified, linked chunks.
pub struct ChunkLinker {
    chapter_number: Regex,
    figure_ref: Regex,
}

impl ChunkLinker {
    /// Create a linker with its extraction patterns compiled.
    pub fn new() -> Self {
        Self {
            chapter_number: Regex::new(r"\b\d+(?:\.\d+)*\b").unwrap(),
            figure_ref: Regex::new(r"(?i)\b(?:Figure|Fig\.?) (\d+(?:\.\d+)*)\b").unwrap(),
        }
    }

    /// Build chunks from segments: fresh ids, chapter and figure-ref
    /// extraction, then one forward pass wiring `prev_id`/`next_id`.
    pub fn link(&self, paper_id: &str, segments: Vec<MarkdownSegment>) -> Vec<Chunk> {
        let mut chunks: Vec<Chunk> = segments
            .into_iter()
            .map(|segment| {
                let chapter_id = segment
                    .chapter
                    .as_deref()
                    .and_then(|c| self.chapter_id(c));
                let fig_ref_ids = self.figure_refs(&segment.content);
                Chunk {
                    id: Uuid::new_v4(),
                    content: segment.content,
                    metadata: ChunkMetadata {
                        paper_id: paper_id.to_string(),
                        chapter: segment.chapter,
                        chapter_id,
                        fig_ref_ids,
                        prev_id: None,
                        next_id: None,
                    },
                }
            })
            .collect();

        for i in 1..chunks.len() {
            let prev_id = chunks[i - 1].id;
            let next_id = chunks[i].id;
            chunks[i].metadata.prev_id = Some(prev_id);
            chunks[i - 1].metadata.next_id = Some(next_id);
        }

        chunks
    }

    /// First section number in a chapter title, e.g. "3.2 Related
    /// Work" → "3.2". `None` for unnumbered chapters.
    pub fn chapter_id(&self, chapter: &str) -> Option<String> {
        self.chapter_number
            .find(chapter)
            .map(|m| m.as_str().to_string())
    }

    /// All figure numbers referenced in a text body.
    pub fn figure_refs(&self, content: &str) -> Vec<String> {
        self.figure_ref
            .captures_iter(content)
            .map(|c| c[1].to_string())
            .collect()
    }
}

impl Default for ChunkLinker {
    fn default() -> Self {
        Self::new()
    }
}
