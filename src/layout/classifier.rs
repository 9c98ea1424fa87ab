//! Row classification predicates.
//!
//! A text row reaches the body stream only if it intersects neither a
//! front-matter region nor a clutter region on its page. Both filters run
//! through one parameterized overlap query over a list of region kinds,
//! so the category lists are data, not code.

use super::{DocumentLayout, Entity, EntityKind, PageLayout};

/// Region kinds that make up the paper's front matter.
pub const FRONT_MATTER_KINDS: &[EntityKind] = &[
    EntityKind::Title,
    EntityKind::Author,
    EntityKind::Abstract,
    EntityKind::Keyword,
];

/// Region kinds excluded from body paragraphs as clutter.
pub const CLUTTER_KINDS: &[EntityKind] = &[
    EntityKind::Figure,
    EntityKind::Table,
    EntityKind::Caption,
    EntityKind::Equation,
    EntityKind::Footer,
    EntityKind::Footnote,
    EntityKind::Header,
];

/// True if the row's primary box overlaps any entity of the given kinds
/// on the page. Pure: reads geometry only, never mutates entities.
pub fn any_overlap(row: &Entity, page: &PageLayout, kinds: &[EntityKind]) -> bool {
    let Some(row_box) = row.primary_box() else {
        return false;
    };
    kinds.iter().any(|&kind| {
        page.entities_of(kind)
            .any(|e| e.primary_box().is_some_and(|b| row_box.overlaps(b)))
    })
}

/// True if the row overlaps a title, author, abstract, or keyword region.
pub fn is_front_matter(row: &Entity, page: &PageLayout) -> bool {
    any_overlap(row, page, FRONT_MATTER_KINDS)
}

/// True if the row overlaps a figure, table, caption, equation, footer,
/// footnote, or header region.
pub fn is_clutter(row: &Entity, page: &PageLayout) -> bool {
    any_overlap(row, page, CLUTTER_KINDS)
}

/// The section entity the row belongs to, if any.
///
/// Returns the first section in the oracle's entity order whose box
/// overlaps the row; that order is oracle-determined.
pub fn section_for<'a>(doc: &'a DocumentLayout, row: &Entity) -> Option<&'a Entity> {
    let row_box = row.primary_box()?;
    doc.section_intersecting(row_box)
}
