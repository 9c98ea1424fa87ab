//! Markdown rendering of assembled paper content.

mod markdown;

pub use markdown::{to_markdown, PaperInfo};
