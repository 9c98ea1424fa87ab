//! Body assembly state machine.
//!
//! Walks the oracle layout page by page, row by row, classifying every
//! text row into the body stream as a section heading or paragraph line.
//! Once a references-indicating heading is seen, paragraph rows go to a
//! side list and the next section heading stops the whole traversal.

use crate::layout::{is_clutter, is_front_matter, section_for, DocumentLayout, Entity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Case-insensitive substrings marking a references section heading.
pub const REFERENCE_MARKERS: &[&str] = &["reference", "citation", "bibliograph"];

/// Kind of an assembled body row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// A section heading
    Section,
    /// A body paragraph line
    Paragraph,
}

/// An immutable assembled row.
///
/// `entity_id` points back at the source entity; hyphenation merging
/// produces new rows rather than mutating these in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedRow {
    /// Row kind, fixed at assembly time
    pub kind: RowKind,
    /// Row text
    pub text: String,
    /// Source entity identity
    pub entity_id: u64,
}

impl TypedRow {
    /// Create a section row from a section entity.
    pub fn section(entity: &Entity) -> Self {
        Self {
            kind: RowKind::Section,
            text: entity.text.clone(),
            entity_id: entity.id,
        }
    }

    /// Create a paragraph row from a row entity.
    pub fn paragraph(entity: &Entity) -> Self {
        Self {
            kind: RowKind::Paragraph,
            text: entity.text.clone(),
            entity_id: entity.id,
        }
    }
}

/// Output of body assembly.
#[derive(Debug, Clone, Default)]
pub struct AssembledBody {
    /// Body rows in document order, sections de-duplicated
    pub rows: Vec<TypedRow>,
    /// Raw text of rows seen after the references heading; kept for
    /// future use, never rendered
    pub reference_rows: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AccumulatingBody,
    InReferences,
}

/// Walks pages and rows, producing the ordered body row list.
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler;

impl DocumentAssembler {
    /// Create a new assembler.
    pub fn new() -> Self {
        Self
    }

    /// Assemble the body row stream from a document layout.
    ///
    /// Traversal is pages in document order, rows in span order within a
    /// page. A section heading encountered after the references heading
    /// ends the traversal for the whole document.
    pub fn assemble(&self, doc: &DocumentLayout) -> AssembledBody {
        let mut state = State::AccumulatingBody;
        let mut rows: Vec<TypedRow> = Vec::new();
        let mut reference_rows: Vec<String> = Vec::new();
        let mut emitted_sections: HashSet<u64> = HashSet::new();

        'pages: for page in &doc.pages {
            log::debug!(
                "assembling page {}: {} row(s)",
                page.index,
                page.rows().count()
            );

            for row in page.rows() {
                if is_front_matter(row, page) || is_clutter(row, page) {
                    continue;
                }

                if let Some(section) = section_for(doc, row) {
                    if state == State::InReferences {
                        log::info!(
                            "section {:?} after references on page {}; stopping traversal",
                            section.text,
                            page.index
                        );
                        break 'pages;
                    }
                    if is_reference_heading(&section.text) {
                        log::debug!("references heading on page {}", page.index);
                        state = State::InReferences;
                        continue;
                    }
                    if emitted_sections.insert(section.id) {
                        rows.push(TypedRow::section(section));
                    }
                    // A row mapping to a section is never a paragraph,
                    // even when the heading was already emitted.
                    continue;
                }

                if state == State::InReferences {
                    reference_rows.push(row.text.clone());
                } else {
                    rows.push(TypedRow::paragraph(row));
                }
            }
        }

        AssembledBody {
            rows,
            reference_rows,
        }
    }
}

/// True if a section heading marks the start of the references section.
pub(crate) fn is_reference_heading(text: &str) -> bool {
    let lower = text.to_lowercase();
    REFERENCE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Merge hyphen-wrapped words across adjacent rows.
///
/// A paragraph row ending in `-` has its trailing fragment joined with
/// the first word of the following row; that word is removed from the
/// following row. Produces new rows, replacing list slots, so source
/// entities are never aliased. A trailing hyphen on the final row is
/// left as-is.
pub fn merge_hyphenated(rows: &[TypedRow]) -> Vec<TypedRow> {
    let mut rows = rows.to_vec();
    for i in 0..rows.len() {
        if rows[i].kind != RowKind::Paragraph || !rows[i].text.ends_with('-') {
            continue;
        }
        if i + 1 >= rows.len() {
            log::debug!("trailing hyphen with no following row; leaving as-is");
            continue;
        }
        let (current, next) = wrap_pair(&rows[i], &rows[i + 1]);
        rows[i] = current;
        rows[i + 1] = next;
    }
    rows
}

fn wrap_pair(first: &TypedRow, second: &TypedRow) -> (TypedRow, TypedRow) {
    let mut first_words: Vec<&str> = first.text.split(' ').collect();
    let mut second_words: Vec<&str> = second.text.split(' ').collect();

    let fragment = first_words.last().copied().unwrap_or_default();
    let continuation = if second_words.is_empty() {
        ""
    } else {
        second_words.remove(0)
    };
    let wrapped = format!("{}{}", fragment.replace('-', "").trim(), continuation);

    if let Some(slot) = first_words.last_mut() {
        *slot = &wrapped;
    }
    let first_text = first_words.join(" ").trim_end().to_string();
    let second_text = second_words.join(" ").trim_end().to_string();

    (
        TypedRow {
            kind: first.kind,
            text: first_text,
            entity_id: first.entity_id,
        },
        TypedRow {
            kind: second.kind,
            text: second_text,
            entity_id: second.entity_id,
        },
    )
}
