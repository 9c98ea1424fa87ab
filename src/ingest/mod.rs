//! Ingestion pipeline and the external capabilities it depends on.

mod capabilities;
mod pipeline;
mod worker;

pub use capabilities::{
    load_tokenizer, ImageEmbedder, PaperStore, SearchHit, TextEmbedder, TextGenerator,
    TokenizerProvider, VectorIndex, VectorPayload,
};
pub use pipeline::{paper_id_for, IngestOptions, IngestOutcome, Ingestor};
pub use worker::{IngestReport, IngestWorkerPool};
