//! Integration tests for the ingestion pipeline, using mock
//! capabilities throughout.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use papermill::chunk::{Chunk, ChunkOptions, Tokenizer};
use papermill::error::{Error, Result};
use papermill::ingest::{
    paper_id_for, ImageEmbedder, IngestOptions, IngestOutcome, IngestReport, IngestWorkerPool,
    Ingestor, PaperStore, SearchHit, TextEmbedder, VectorIndex, VectorPayload,
};
use papermill::{BoundingBox, DocumentLayout, Entity, EntityKind, LayoutOracle, PageLayout};

fn bbox(page: usize, x0: f32, y0: f32, x1: f32, y1: f32) -> BoundingBox {
    BoundingBox::new(page, x0, y0, x1, y1)
}

/// Oracle returning a fixed layout regardless of the input path.
struct FixedOracle {
    layout: DocumentLayout,
}

impl LayoutOracle for FixedOracle {
    fn analyze(&self, _path: &Path) -> Result<DocumentLayout> {
        Ok(self.layout.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

#[derive(Default)]
struct MemoryStore {
    papers: Mutex<HashMap<String, String>>,
    infos: Mutex<HashMap<String, String>>,
    chunks: Mutex<Vec<Chunk>>,
    fail_chunk_insert: AtomicBool,
}

impl PaperStore for MemoryStore {
    fn exists(&self, paper_id: &str) -> Result<bool> {
        Ok(self.papers.lock().unwrap().contains_key(paper_id))
    }

    fn insert_paper(&self, paper_id: &str, filename: &str) -> Result<()> {
        self.papers
            .lock()
            .unwrap()
            .insert(paper_id.to_string(), filename.to_string());
        Ok(())
    }

    fn insert_paper_info(&self, paper_id: &str, content: &str) -> Result<()> {
        self.infos
            .lock()
            .unwrap()
            .insert(paper_id.to_string(), content.to_string());
        Ok(())
    }

    fn insert_chunk(&self, chunk: &Chunk) -> Result<()> {
        if self.fail_chunk_insert.load(Ordering::SeqCst) {
            return Err(Error::Storage("chunk table unavailable".to_string()));
        }
        self.chunks.lock().unwrap().push(chunk.clone());
        Ok(())
    }

    fn delete_paper(&self, paper_id: &str) -> Result<()> {
        self.papers.lock().unwrap().remove(paper_id);
        self.infos.lock().unwrap().remove(paper_id);
        self.chunks
            .lock()
            .unwrap()
            .retain(|c| c.metadata.paper_id != paper_id);
        Ok(())
    }

    fn list_papers(&self) -> Result<Vec<String>> {
        Ok(self.papers.lock().unwrap().keys().cloned().collect())
    }
}

#[derive(Default)]
struct MemoryIndex {
    points: Mutex<Vec<(uuid::Uuid, Vec<f32>, VectorPayload)>>,
}

impl VectorIndex for MemoryIndex {
    fn upsert(&self, id: uuid::Uuid, vector: Vec<f32>, payload: VectorPayload) -> Result<()> {
        self.points.lock().unwrap().push((id, vector, payload));
        Ok(())
    }

    fn search(&self, _query: &str, _k: usize, _paper_id: &str) -> Result<Vec<SearchHit>> {
        Ok(Vec::new())
    }
}

struct ZeroTextEmbedder;

impl TextEmbedder for ZeroTextEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.0; 4])
    }
}

struct ZeroImageEmbedder;

impl ImageEmbedder for ZeroImageEmbedder {
    fn embed(&self, _image: &image::RgbaImage) -> Result<Vec<f32>> {
        Ok(vec![1.0; 4])
    }
}

struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn max_sequence_length(&self) -> Option<usize> {
        Some(512)
    }
}

/// One-page layout with front matter, a section, body rows, and a
/// figure with a caption.
fn paper_layout() -> DocumentLayout {
    let mut page = PageLayout::new(0, 200, 400);
    page.raster = Some(image::RgbaImage::from_pixel(
        200,
        400,
        image::Rgba([255, 255, 255, 255]),
    ));
    page.add_entity(Entity::new(
        1,
        EntityKind::Title,
        "Mock Paper",
        bbox(0, 0.1, 0.02, 0.9, 0.06),
    ));
    page.add_entity(Entity::new(
        2,
        EntityKind::Section,
        "1 Introduction",
        bbox(0, 0.1, 0.1, 0.9, 0.14),
    ));
    page.add_entity(Entity::new(
        3,
        EntityKind::Row,
        "1 Introduction",
        bbox(0, 0.1, 0.11, 0.9, 0.13),
    ));
    page.add_entity(Entity::new(
        4,
        EntityKind::Row,
        "Results appear in Figure 1 below.",
        bbox(0, 0.1, 0.2, 0.9, 0.22),
    ));
    page.add_entity(Entity::new(
        5,
        EntityKind::Figure,
        "",
        bbox(0, 0.1, 0.3, 0.9, 0.5),
    ));
    page.add_entity(Entity::new(
        6,
        EntityKind::Caption,
        "Figure 1: mock results",
        bbox(0, 0.1, 0.52, 0.9, 0.55),
    ));
    let mut layout = DocumentLayout::new();
    layout.add_page(page);
    layout
}

struct Harness {
    ingestor: Ingestor,
    store: Arc<MemoryStore>,
    index: Arc<MemoryIndex>,
    _image_dir: tempfile::TempDir,
    image_root: std::path::PathBuf,
}

fn harness(layout: DocumentLayout) -> Harness {
    let store = Arc::new(MemoryStore::default());
    let index = Arc::new(MemoryIndex::default());
    let image_dir = tempfile::tempdir().unwrap();
    let image_root = image_dir.path().to_path_buf();

    let options = IngestOptions::new()
        .with_image_dir(&image_root)
        .with_chunk_options(ChunkOptions::new().with_chunk_size(128).with_size_penalty(0));

    let ingestor = Ingestor::new(
        Arc::new(FixedOracle { layout }),
        store.clone(),
        index.clone(),
        Arc::new(ZeroTextEmbedder),
        Arc::new(ZeroImageEmbedder),
        Arc::new(WordTokenizer),
        options,
    );

    Harness {
        ingestor,
        store,
        index,
        _image_dir: image_dir,
        image_root,
    }
}

fn write_paper_file(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("paper.pdf");
    std::fs::write(&path, b"mock paper bytes").unwrap();
    path
}

#[test]
fn test_successful_ingest() {
    let h = harness(paper_layout());
    let dir = tempfile::tempdir().unwrap();
    let path = write_paper_file(dir.path());
    let expected_id = paper_id_for(b"mock paper bytes");

    let outcome = h.ingestor.ingest(&path).unwrap();
    match outcome {
        IngestOutcome::Ingested {
            paper_id,
            chunk_count,
            figure_count,
        } => {
            assert_eq!(paper_id, expected_id);
            assert_eq!(chunk_count, 1);
            assert_eq!(figure_count, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    // paper row, paper info, and chunk row all stored
    assert!(h.store.exists(&expected_id).unwrap());
    assert!(h.store.infos.lock().unwrap()[&expected_id].contains("# Mock Paper"));
    let chunks = h.store.chunks.lock().unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].metadata.fig_ref_ids, vec!["1".to_string()]);

    // one text point and one image point upserted
    assert_eq!(h.index.points.lock().unwrap().len(), 2);

    // figure saved under the per-paper directory
    let fig_path = h.image_root.join(&expected_id).join("fig_0_0.png");
    assert!(fig_path.exists());
}

#[test]
fn test_duplicate_ingest_is_noop() {
    let h = harness(paper_layout());
    let dir = tempfile::tempdir().unwrap();
    let path = write_paper_file(dir.path());

    let first = h.ingestor.ingest(&path).unwrap();
    assert!(matches!(first, IngestOutcome::Ingested { .. }));

    let second = h.ingestor.ingest(&path).unwrap();
    assert!(matches!(second, IngestOutcome::Duplicate { .. }));

    // nothing written twice
    assert_eq!(h.store.chunks.lock().unwrap().len(), 1);
    assert_eq!(h.index.points.lock().unwrap().len(), 2);
}

#[test]
fn test_storage_failure_rolls_back_paper_row() {
    let h = harness(paper_layout());
    h.store.fail_chunk_insert.store(true, Ordering::SeqCst);
    let dir = tempfile::tempdir().unwrap();
    let path = write_paper_file(dir.path());
    let paper_id = paper_id_for(b"mock paper bytes");

    let result = h.ingestor.ingest(&path);
    assert!(matches!(result, Err(Error::Storage(_))));

    // the paper row was deleted so a retry is possible
    assert!(!h.store.exists(&paper_id).unwrap());

    h.store.fail_chunk_insert.store(false, Ordering::SeqCst);
    let retried = h.ingestor.ingest(&path).unwrap();
    assert!(matches!(retried, IngestOutcome::Ingested { .. }));
}

#[test]
fn test_worker_pool_reports_every_job() {
    let h = harness(paper_layout());
    let dir = tempfile::tempdir().unwrap();
    let good = write_paper_file(dir.path());
    let missing = dir.path().join("missing.pdf");

    let (pool, reports) = IngestWorkerPool::spawn(Arc::new(h.ingestor), 2);
    pool.submit(good.clone()).unwrap();
    pool.submit(missing.clone()).unwrap();
    pool.shutdown();

    let collected: Vec<IngestReport> = reports.iter().collect();
    assert_eq!(collected.len(), 2);

    let ok = collected.iter().find(|r| r.path == good).unwrap();
    assert!(matches!(ok.result, Ok(IngestOutcome::Ingested { .. })));

    // a failing job is reported, not swallowed
    let failed = collected.iter().find(|r| r.path == missing).unwrap();
    assert!(matches!(failed.result, Err(Error::Io(_))));
    assert_eq!(h.store.chunks.lock().unwrap().len(), 1);
}

#[test]
fn test_worker_pool_drop_finishes_queued_work() {
    let h = harness(paper_layout());
    let dir = tempfile::tempdir().unwrap();
    let path = write_paper_file(dir.path());

    let (pool, reports) = IngestWorkerPool::spawn(Arc::new(h.ingestor), 1);
    pool.submit(path.clone()).unwrap();
    drop(pool);

    // drop joined the worker, so the report is already buffered
    let report = reports.try_recv().unwrap();
    assert_eq!(report.path, path);
    assert!(matches!(report.result, Ok(IngestOutcome::Ingested { .. })));
}

#[test]
fn test_empty_layout_aborts_ingestion() {
    let h = harness(DocumentLayout::new());
    let dir = tempfile::tempdir().unwrap();
    let path = write_paper_file(dir.path());
    let paper_id = paper_id_for(b"mock paper bytes");

    let result = h.ingestor.ingest(&path);
    assert!(matches!(result, Err(Error::MalformedLayout(_))));
    assert!(!h.store.exists(&paper_id).unwrap());
}

#[test]
fn test_rasterless_layout_aborts_ingestion() {
    let mut layout = paper_layout();
    layout.pages[0].raster = None;
    let h = harness(layout);
    let dir = tempfile::tempdir().unwrap();
    let path = write_paper_file(dir.path());

    let result = h.ingestor.ingest(&path);
    assert!(matches!(result, Err(Error::MalformedLayout(_))));
}
