//! Document assembly: ordered body rows and figure records.

mod assembler;
mod figures;

pub use assembler::{
    merge_hyphenated, AssembledBody, DocumentAssembler, RowKind, TypedRow, REFERENCE_MARKERS,
};
pub use figures::{extract_document_figures, extract_page_figures, ImageRecord, CAPTION_MARGIN};
