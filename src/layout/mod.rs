//! Layout-oracle facing types and row classification.
//!
//! Everything in this module is produced by an external layout-detection
//! model; the core only reads it. The [`LayoutOracle`] trait is the
//! injection seam for a concrete engine.

mod classifier;
mod oracle;

pub use classifier::{
    any_overlap, is_clutter, is_front_matter, section_for, CLUTTER_KINDS, FRONT_MATTER_KINDS,
};
pub use oracle::{DocumentLayout, Entity, EntityKind, LayoutOracle, PageLayout};

pub(crate) use oracle::concat_collapsing;
