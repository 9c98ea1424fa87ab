//! Worker-thread dispatch for long-running ingestion.
//!
//! Ingestion is CPU-bound per document and must not run on a
//! user-facing thread. The pool takes paths on a channel, runs them on
//! worker threads, and reports each outcome on a result channel. There
//! is no cancellation for in-flight jobs.

use super::{IngestOutcome, Ingestor};
use crate::error::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Outcome report for one submitted document.
#[derive(Debug)]
pub struct IngestReport {
    /// The submitted path
    pub path: PathBuf,
    /// Pipeline result for the document
    pub result: Result<IngestOutcome>,
}

/// A fixed pool of ingestion worker threads.
pub struct IngestWorkerPool {
    sender: Option<Sender<PathBuf>>,
    handles: Vec<JoinHandle<()>>,
}

impl IngestWorkerPool {
    /// Spawn `workers` threads sharing one ingestor. Returns the pool
    /// and the receiver for outcome reports.
    pub fn spawn(ingestor: Arc<Ingestor>, workers: usize) -> (Self, Receiver<IngestReport>) {
        let (job_tx, job_rx) = unbounded::<PathBuf>();
        let (report_tx, report_rx) = unbounded::<IngestReport>();

        let handles = (0..workers.max(1))
            .map(|worker_id| {
                let job_rx = job_rx.clone();
                let report_tx = report_tx.clone();
                let ingestor = Arc::clone(&ingestor);
                std::thread::spawn(move || {
                    for path in job_rx.iter() {
                        log::debug!("worker {} ingesting {}", worker_id, path.display());
                        let result = ingestor.ingest(&path);
                        if let Err(ref err) = result {
                            log::warn!("ingestion of {} failed: {}", path.display(), err);
                        }
                        if report_tx.send(IngestReport { path, result }).is_err() {
                            // Receiver gone; nobody is listening anymore.
                            return;
                        }
                    }
                })
            })
            .collect();

        (
            Self {
                sender: Some(job_tx),
                handles,
            },
            report_rx,
        )
    }

    /// Queue a document for ingestion.
    pub fn submit(&self, path: PathBuf) -> Result<()> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| Error::Other("worker pool is shut down".to_string()))?;
        sender
            .send(path)
            .map_err(|e| Error::Other(format!("worker pool rejected job: {}", e)))
    }

    /// Close the queue and wait for in-flight jobs to finish.
    ///
    /// Dropping the pool has the same effect, so queued work is never
    /// silently abandoned.
    pub fn shutdown(self) {}
}

impl Drop for IngestWorkerPool {
    fn drop(&mut self) {
        self.sender.take();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::warn!("ingestion worker panicked");
            }
        }
    }
}
