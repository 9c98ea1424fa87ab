//! Oracle-provided layout types.

use crate::error::Result;
use crate::geometry::BoundingBox;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Region-of-interest kinds reported by the layout oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Paper title region
    Title,
    /// Author list region
    Author,
    /// Abstract region
    Abstract,
    /// Keyword list region
    Keyword,
    /// Section heading region
    Section,
    /// Figure region
    Figure,
    /// Table region
    Table,
    /// Figure/table caption region
    Caption,
    /// Display equation region
    Equation,
    /// Page footer region
    Footer,
    /// Footnote region
    Footnote,
    /// Page header region
    Header,
    /// A single text row in reading order
    Row,
}

/// A typed region of interest produced by the layout oracle.
///
/// The core never mutates entities; `id` is the oracle-assigned identity
/// used for section de-duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Oracle-assigned identity, unique within one document
    pub id: u64,
    /// Region kind
    pub kind: EntityKind,
    /// Text span covered by the region
    pub text: String,
    /// One or more boxes covering the region
    pub boxes: Vec<BoundingBox>,
}

impl Entity {
    /// Create a new entity with a single box.
    pub fn new(id: u64, kind: EntityKind, text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            id,
            kind,
            text: text.into(),
            boxes: vec![bbox],
        }
    }

    /// Primary box of the entity, if any.
    ///
    /// Oracles report the dominant box first; all geometric predicates
    /// operate on it.
    pub fn primary_box(&self) -> Option<&BoundingBox> {
        self.boxes.first()
    }
}

/// One page of oracle output: entities plus the rendered raster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page index (0-indexed)
    pub index: usize,
    /// Raster width in pixels
    pub width: u32,
    /// Raster height in pixels
    pub height: u32,
    /// All entities detected on the page, in oracle order
    pub entities: Vec<Entity>,
    /// Rendered page raster; absent in raster-free test layouts
    #[serde(skip)]
    pub raster: Option<RgbaImage>,
}

impl PageLayout {
    /// Create a page layout without a raster.
    pub fn new(index: usize, width: u32, height: u32) -> Self {
        Self {
            index,
            width,
            height,
            entities: Vec::new(),
            raster: None,
        }
    }

    /// Add an entity to the page.
    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Iterate entities of one kind, in oracle order.
    pub fn entities_of(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.kind == kind)
    }

    /// Text rows of the page in reading (span) order.
    pub fn rows(&self) -> impl Iterator<Item = &Entity> {
        self.entities_of(EntityKind::Row)
    }

    /// Figure regions of the page, in oracle order.
    pub fn figures(&self) -> impl Iterator<Item = &Entity> {
        self.entities_of(EntityKind::Figure)
    }

    /// Concatenate the text of all entities of `kind` in oracle order,
    /// trimming each span and collapsing soft-hyphen line breaks.
    pub fn concatenated_text(&self, kind: EntityKind) -> String {
        concat_collapsing(self.entities_of(kind).map(|e| e.text.as_str()))
    }
}

/// Full document layout as returned by the oracle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentLayout {
    /// Pages in document order
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    /// Add a page to the layout.
    pub fn add_page(&mut self, page: PageLayout) {
        self.pages.push(page);
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether the layout has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// First section entity (in oracle entity order) whose primary box
    /// overlaps `bbox`. The "first match" ordering is oracle-determined,
    /// not recomputed here.
    pub fn section_intersecting(&self, bbox: &BoundingBox) -> Option<&Entity> {
        self.pages.get(bbox.page).and_then(|page| {
            page.entities_of(EntityKind::Section)
                .find(|s| s.primary_box().is_some_and(|b| b.overlaps(bbox)))
        })
    }

    /// Caption entities whose primary box overlaps `bbox`, in oracle order.
    pub fn captions_intersecting(&self, bbox: &BoundingBox) -> Vec<&Entity> {
        self.pages
            .get(bbox.page)
            .map(|page| {
                page.entities_of(EntityKind::Caption)
                    .filter(|c| c.primary_box().is_some_and(|b| b.overlaps(bbox)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Concatenate text segments with inter-segment whitespace stripped,
/// collapsing soft-hyphen line breaks: a segment ending in `-` joins the
/// next segment without the hyphen, and intra-segment `"- "` wraps are
/// removed.
pub(crate) fn concat_collapsing<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut text = String::new();
    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if text.ends_with('-') {
            text.pop();
        }
        text.push_str(segment);
    }
    text.replace("- ", "")
}

/// External layout-detection engine.
///
/// Implementations wrap whatever model produces the entity/box layout;
/// the core consumes the result through [`DocumentLayout`] only.
pub trait LayoutOracle {
    /// Analyze a document file and return its layout.
    fn analyze(&self, path: &Path) -> Result<DocumentLayout>;

    /// Engine name for diagnostics.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x0: f32, y0: f32, x1: f32, y1: f32) -> BoundingBox {
        BoundingBox::new(0, x0, y0, x1, y1)
    }

    #[test]
    fn test_entities_of_kind() {
        let mut page = PageLayout::new(0, 800, 1000);
        page.add_entity(Entity::new(1, EntityKind::Title, "A Title", bbox(0.1, 0.05, 0.9, 0.1)));
        page.add_entity(Entity::new(2, EntityKind::Row, "a row", bbox(0.1, 0.2, 0.9, 0.22)));
        page.add_entity(Entity::new(3, EntityKind::Row, "another", bbox(0.1, 0.23, 0.9, 0.25)));

        assert_eq!(page.rows().count(), 2);
        assert_eq!(page.entities_of(EntityKind::Title).count(), 1);
    }

    #[test]
    fn test_concatenated_text_collapses_soft_hyphens() {
        let mut page = PageLayout::new(0, 800, 1000);
        page.add_entity(Entity::new(1, EntityKind::Caption, "Figure 1: a cap- ", bbox(0.1, 0.5, 0.9, 0.52)));
        page.add_entity(Entity::new(2, EntityKind::Caption, "tion split over lines", bbox(0.1, 0.53, 0.9, 0.55)));

        let text = page.concatenated_text(EntityKind::Caption);
        assert_eq!(text, "Figure 1: a caption split over lines");
    }

    #[test]
    fn test_section_intersecting_first_in_oracle_order() {
        let mut page = PageLayout::new(0, 800, 1000);
        page.add_entity(Entity::new(10, EntityKind::Section, "1 Intro", bbox(0.1, 0.3, 0.9, 0.35)));
        page.add_entity(Entity::new(11, EntityKind::Section, "2 Method", bbox(0.1, 0.3, 0.9, 0.36)));
        let mut doc = DocumentLayout::new();
        doc.add_page(page);

        let row_box = bbox(0.1, 0.31, 0.9, 0.34);
        let section = doc.section_intersecting(&row_box).unwrap();
        assert_eq!(section.id, 10);
    }

    #[test]
    fn test_section_intersecting_out_of_range_page() {
        let doc = DocumentLayout::new();
        let row_box = BoundingBox::new(3, 0.1, 0.1, 0.9, 0.2);
        assert!(doc.section_intersecting(&row_box).is_none());
    }
}
