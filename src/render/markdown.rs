//! Canonical markdown serialization.
//!
//! Output layout:
//!
//! ```text
//! # {title}
//!
//! Paper Authors: {authors}
//!
//! Paper Abstract: {abstract}
//!
//! Paper Keywords: {keywords}
//!
//! ## {section}
//!
//! {paragraph}
//! ...
//! ```

use crate::assemble::{merge_hyphenated, RowKind, TypedRow};
use crate::layout::{DocumentLayout, EntityKind};
use serde::{Deserialize, Serialize};

/// Front-matter text of a paper, extracted from the first page only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperInfo {
    /// Paper title
    pub title: String,
    /// Author list as a single string
    pub authors: String,
    /// Abstract text
    pub abstract_text: String,
    /// Keyword list as a single string
    pub keywords: String,
}

impl PaperInfo {
    /// Extract front-matter text from the first page of a layout.
    ///
    /// Each field is the concatenation of all entity text of the matching
    /// kind, in oracle order. Empty when the layout has no pages.
    pub fn from_layout(doc: &DocumentLayout) -> Self {
        let Some(first_page) = doc.pages.first() else {
            return Self::default();
        };
        Self {
            title: first_page.concatenated_text(EntityKind::Title),
            authors: first_page.concatenated_text(EntityKind::Author),
            abstract_text: first_page.concatenated_text(EntityKind::Abstract),
            keywords: first_page.concatenated_text(EntityKind::Keyword),
        }
    }

    /// Authors line with its literal label.
    pub fn authors_line(&self) -> String {
        format!("Paper Authors: {}", self.authors)
    }

    /// Abstract line, labeled only when the word "abstract" is not
    /// already present in the extracted text.
    pub fn abstract_line(&self) -> String {
        labeled_unless_present(&self.abstract_text, "abstract", "Paper Abstract: ")
    }

    /// Keywords line, labeled only when the word "keywords" is not
    /// already present in the extracted text.
    pub fn keywords_line(&self) -> String {
        labeled_unless_present(&self.keywords, "keywords", "Paper Keywords: ")
    }
}

fn labeled_unless_present(text: &str, word: &str, label: &str) -> String {
    if text.to_lowercase().contains(word) {
        text.to_string()
    } else {
        format!("{}{}", label, text)
    }
}

/// Serialize front matter and body rows into the canonical markdown
/// document. Hyphen-wrapped words are merged first.
pub fn to_markdown(info: &PaperInfo, rows: &[TypedRow]) -> String {
    let mut content = String::new();
    content.push_str(&format!("# {}\n\n", info.title));
    content.push_str(&format!("{}\n\n", info.authors_line()));
    content.push_str(&format!("{}\n\n", info.abstract_line()));
    content.push_str(&format!("{}\n", info.keywords_line()));

    for row in merge_hyphenated(rows) {
        match row.kind {
            RowKind::Section => content.push_str(&format!("\n## {}\n\n", row.text)),
            RowKind::Paragraph => content.push_str(&format!("{}\n", row.text)),
        }
    }

    log::info!("rendered markdown: {} byte(s)", content.len());
    content
}
