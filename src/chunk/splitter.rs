//! Markdown header splitting and token-budget sentence splitting.

/// Token counting surface of the target embedding model.
///
/// Chunk budgets are measured with the same tokenizer the embedding
/// model uses, so chunks never exceed its sequence window.
pub trait Tokenizer: Send + Sync {
    /// Number of tokens the model would produce for `text`.
    fn count_tokens(&self, text: &str) -> usize;

    /// Maximum sequence length of the model, when known.
    fn max_sequence_length(&self) -> Option<usize>;
}

/// A header-delimited markdown segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownSegment {
    /// Heading text of the `## ` chapter the segment belongs to
    pub chapter: Option<String>,
    /// Segment body
    pub content: String,
}

/// Split a markdown document at every `## ` heading.
///
/// Returns the pre-first-heading block (the paper-info unit) and one
/// segment per chapter carrying the heading text as `chapter`.
pub fn split_headers(markdown: &str) -> (String, Vec<MarkdownSegment>) {
    let mut paper_info = String::new();
    let mut segments: Vec<MarkdownSegment> = Vec::new();
    let mut current_chapter: Option<String> = None;
    let mut current_body = String::new();

    for line in markdown.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            flush_segment(&mut paper_info, &mut segments, &current_chapter, &current_body);
            current_chapter = Some(heading.trim().to_string());
            current_body = String::new();
        } else {
            current_body.push_str(line);
            current_body.push('\n');
        }
    }
    flush_segment(&mut paper_info, &mut segments, &current_chapter, &current_body);

    (paper_info, segments)
}

fn flush_segment(
    paper_info: &mut String,
    segments: &mut Vec<MarkdownSegment>,
    chapter: &Option<String>,
    body: &str,
) {
    let body = body.trim();
    match chapter {
        None => *paper_info = body.to_string(),
        Some(chapter) => {
            if !body.is_empty() {
                segments.push(MarkdownSegment {
                    chapter: Some(chapter.clone()),
                    content: body.to_string(),
                });
            }
        }
    }
}

/// Recursive sentence-boundary splitter with a token budget.
///
/// Splits on `". "` first (separator retained with the preceding
/// sentence), falling back to single-space word splits for sentences
/// that alone exceed the budget. A configured number of trailing tokens
/// is repeated at the start of the following chunk.
#[derive(Debug, Clone)]
pub struct TokenSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

const SEPARATORS: &[&str] = &[". ", " "];

impl TokenSplitter {
    /// Create a splitter with the given budget and overlap, in tokens.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split `text` into chunks within the token budget.
    pub fn split(&self, text: &str, tokenizer: &dyn Tokenizer) -> Vec<String> {
        self.split_at_depth(text, tokenizer, 0)
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect()
    }

    fn split_at_depth(&self, text: &str, tokenizer: &dyn Tokenizer, depth: usize) -> Vec<String> {
        if tokenizer.count_tokens(text) <= self.chunk_size {
            return vec![text.to_string()];
        }
        let Some(separator) = SEPARATORS.get(depth) else {
            // Out of separators; emit as-is rather than cutting inside
            // a word.
            log::warn!(
                "piece of {} token(s) exceeds the budget of {} and cannot be split further",
                tokenizer.count_tokens(text),
                self.chunk_size
            );
            return vec![text.to_string()];
        };

        let units: Vec<&str> = text.split_inclusive(separator).collect();
        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();

        for unit in units {
            let candidate = format!("{}{}", current, unit);
            if tokenizer.count_tokens(&candidate) > self.chunk_size && !current.is_empty() {
                let overlap = self.overlap_suffix(&current, separator, tokenizer);
                chunks.push(current);
                current = format!("{}{}", overlap, unit);
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }

        // Units that alone exceed the budget descend to the next
        // separator.
        chunks
            .into_iter()
            .flat_map(|chunk| {
                if tokenizer.count_tokens(&chunk) > self.chunk_size {
                    self.split_at_depth(&chunk, tokenizer, depth + 1)
                } else {
                    vec![chunk]
                }
            })
            .collect()
    }

    /// Longest suffix of whole units not exceeding the overlap budget.
    fn overlap_suffix(&self, chunk: &str, separator: &str, tokenizer: &dyn Tokenizer) -> String {
        if self.chunk_overlap == 0 {
            return String::new();
        }
        let units: Vec<&str> = chunk.split_inclusive(separator).collect();
        let mut suffix = String::new();
        for unit in units.iter().rev() {
            let candidate = format!("{}{}", unit, suffix);
            if tokenizer.count_tokens(&candidate) > self.chunk_overlap {
                break;
            }
            suffix = candidate;
        }
        suffix
    }
}
