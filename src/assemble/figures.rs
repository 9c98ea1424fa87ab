//! Figure extraction and caption resolution.

use crate::error::Result;
use crate::layout::{DocumentLayout, Entity, PageLayout};
use image::RgbaImage;
use rayon::prelude::*;

/// Vertical margin (relative units) used when searching for a caption
/// near a figure. Applied through the asymmetric box extension, so the
/// query reaches twice as far below the figure as above it.
pub const CAPTION_MARGIN: f32 = 0.05;

/// A figure cropped from a page raster, with its resolved caption.
///
/// Created during page traversal and never mutated afterwards.
/// `figure_index` is page-local, restarting at 0 on every page.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// Cropped figure raster
    pub image: RgbaImage,
    /// Caption text, if a caption region was found nearby
    pub caption: Option<String>,
    /// Page index (0-indexed)
    pub page_index: usize,
    /// Figure index within the page (0-indexed)
    pub figure_index: usize,
}

/// Extract all figures from a document, pages in parallel.
///
/// Page order is preserved in the returned list.
pub fn extract_document_figures(doc: &DocumentLayout) -> Result<Vec<ImageRecord>> {
    let per_page: Vec<Vec<ImageRecord>> = doc
        .pages
        .par_iter()
        .map(|page| extract_page_figures(doc, page))
        .collect::<Result<_>>()?;
    Ok(per_page.into_iter().flatten().collect())
}

/// Extract the figures of a single page.
///
/// A page without a rendered raster yields no records; figure regions on
/// it are skipped rather than treated as an error.
pub fn extract_page_figures(doc: &DocumentLayout, page: &PageLayout) -> Result<Vec<ImageRecord>> {
    let mut records = Vec::new();
    if page.raster.is_none() {
        if page.figures().next().is_some() {
            log::warn!(
                "page {} has figure regions but no raster; skipping crops",
                page.index
            );
        }
        return Ok(records);
    }
    for (figure_index, figure) in page.figures().enumerate() {
        let caption = caption_for(doc, figure);
        log::debug!(
            "figure {} on page {}: caption {}",
            figure_index,
            page.index,
            if caption.is_some() { "found" } else { "none" }
        );
        let Some(image) = crop_figure(page, figure) else {
            continue;
        };
        records.push(ImageRecord {
            image,
            caption,
            page_index: page.index,
            figure_index,
        });
    }
    Ok(records)
}

/// Resolve the caption of a figure entity.
///
/// Extends the figure box by [`CAPTION_MARGIN`] and concatenates the text
/// of every caption entity intersecting the extended box, collapsing
/// soft-hyphen line breaks. `None` when no caption region is nearby.
fn caption_for(doc: &DocumentLayout, figure: &Entity) -> Option<String> {
    let fig_box = figure.primary_box()?;
    let search_box = fig_box.extend_vertical(CAPTION_MARGIN);
    let captions = doc.captions_intersecting(&search_box);
    if captions.is_empty() {
        return None;
    }
    Some(crate::layout::concat_collapsing(
        captions.iter().map(|c| c.text.as_str()),
    ))
}

/// Crop the figure's absolute pixel box out of the page raster.
///
/// A figure without a box, or whose crop has zero area, is a layout gap:
/// it yields `None` with a warning rather than failing the document.
fn crop_figure(page: &PageLayout, figure: &Entity) -> Option<RgbaImage> {
    let raster = page.raster.as_ref()?;
    let Some(fig_box) = figure.primary_box() else {
        log::warn!("figure on page {} has no box; skipping crop", page.index);
        return None;
    };

    let px = fig_box.to_absolute(page.width, page.height);
    let x = px.x0.min(raster.width());
    let y = px.y0.min(raster.height());
    let w = px.width().min(raster.width() - x);
    let h = px.height().min(raster.height() - y);
    if w == 0 || h == 0 {
        log::warn!(
            "figure crop on page {} is empty ({}x{}); skipping",
            page.index,
            w,
            h
        );
        return None;
    }
    Some(image::imageops::crop_imm(raster, x, y, w, h).to_image())
}
