//! Document retrieval
//!
//! Combines extractor, chunker, embedder and index into one build/query API.
//!
//! # Usage
//!
//! ```ignore
//! use bookmentor_lib::retrieve::Retriever;
//!
//! let retriever = Retriever::new(MiniLmEmbedder::new()?, WordWindowChunker::default());
//! retriever.ingest(&std::fs::read("biology.pdf")?)?;
//! let passages = retriever.retrieve("cell respiration", 5)?;
//! ```
//!
//! # Concurrency
//!
//! The chunk list and the index built from it are published together as one
//! immutable [`Corpus`]. Ingestion builds a new corpus to the side and swaps
//! it in with a single store, so concurrent readers see either the old pair
//! or the new one. Ingestions are serialized.
//!
//! Loading the snapshot never blocks. Embedding the query does go through
//! the embedder, which may serialize model calls (see [`MiniLmEmbedder`]),
//! so a query can wait behind an ingestion's embedding batch or another
//! query.
//!
//! [`MiniLmEmbedder`]: crate::embed::MiniLmEmbedder

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chunk::{Chunk, WordWindowChunker};
use crate::embed::Embedder;
use crate::extract::{PdfExtractor, TextExtractor};
use crate::index::{FlatIndex, VectorIndex};
use crate::{Error, Result};

/// Chunks of one document and the index over their embeddings.
///
/// Index position `i` is chunk `i`.
#[derive(Debug)]
pub struct Corpus<I> {
    chunks: Vec<Chunk>,
    index: I,
}

impl<I: VectorIndex> Corpus<I> {
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[must_use]
    pub fn index(&self) -> &I {
        &self.index
    }
}

/// A retrieved chunk with its distance to the query
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    /// L2 distance between query and chunk embeddings (lower is closer)
    pub distance: f32,
}

/// Summary of a successful ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub chunks: usize,
    pub dimension: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Success,
    Error,
}

/// Ingestion result in the `{status, message}` shape handed to callers
/// that only relay it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub status: IngestStatus,
    pub message: String,
}

impl IngestOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == IngestStatus::Success
    }
}

/// Builds an index from one document and answers nearest-chunk queries
/// against it.
pub struct Retriever<E: Embedder, X: TextExtractor = PdfExtractor, I: VectorIndex = FlatIndex> {
    embedder: E,
    extractor: X,
    chunker: WordWindowChunker,
    corpus: ArcSwapOption<Corpus<I>>,
    ingest_lock: Mutex<()>,
}

// Constructor for PDF retrievers
impl<E: Embedder> Retriever<E> {
    /// Create a retriever reading PDF documents.
    #[must_use]
    pub fn new(embedder: E, chunker: WordWindowChunker) -> Self {
        Self::with_extractor(embedder, PdfExtractor, chunker)
    }
}

impl<E: Embedder, X: TextExtractor, I: VectorIndex> Retriever<E, X, I> {
    /// Create a retriever with a custom document extractor.
    #[must_use]
    pub fn with_extractor(embedder: E, extractor: X, chunker: WordWindowChunker) -> Self {
        Self {
            embedder,
            extractor,
            chunker,
            corpus: ArcSwapOption::empty(),
            ingest_lock: Mutex::new(()),
        }
    }

    /// Extract, chunk, embed and index a document, replacing the current
    /// corpus on success.
    ///
    /// On failure the previous corpus (if any) stays in place.
    pub fn ingest(&self, document: &[u8]) -> Result<IngestReport> {
        let text = self.extractor.extract(document)?;
        debug!(
            format = self.extractor.format(),
            bytes = document.len(),
            chars = text.len(),
            "extracted document text"
        );
        self.ingest_text(&text)
    }

    /// Chunk, embed and index already extracted text, replacing the current
    /// corpus on success.
    pub fn ingest_text(&self, text: &str) -> Result<IngestReport> {
        let _writer = self.ingest_lock.lock();

        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            return Err(Error::EmptyChunks);
        }
        debug!(chunks = chunks.len(), stride = self.chunker.stride(), "chunked text");

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedder.embed_documents(&texts)?;
        if embeddings.len() != chunks.len() {
            return Err(Error::EmbeddingProvider(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let index = I::build(embeddings)?;
        let report = IngestReport {
            chunks: chunks.len(),
            dimension: index.dimension(),
        };

        self.corpus.store(Some(Arc::new(Corpus { chunks, index })));
        info!(
            chunks = report.chunks,
            dimension = report.dimension,
            model = self.embedder.model_name(),
            "indexed document"
        );

        Ok(report)
    }

    /// Ingest a document and report the result as an [`IngestOutcome`].
    pub fn ingest_outcome(&self, document: &[u8]) -> IngestOutcome {
        match self.ingest(document) {
            Ok(report) => IngestOutcome {
                status: IngestStatus::Success,
                message: format!(
                    "Book uploaded and indexed successfully ({} chunks)",
                    report.chunks
                ),
            },
            Err(e) => {
                warn!(error = %e, "ingestion failed");
                IngestOutcome {
                    status: IngestStatus::Error,
                    message: e.to_string(),
                }
            }
        }
    }

    /// Search for the `k` chunks nearest to the query, closest first.
    ///
    /// Returns an empty list when nothing has been ingested yet, so callers
    /// can fall back to generating without context.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let Some(corpus) = self.corpus.load_full() else {
            debug!("no document indexed, returning no chunks");
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(query)?;
        let neighbors = corpus.index.search(&query_embedding, k)?;

        Ok(neighbors
            .into_iter()
            .map(|n| RetrievedChunk {
                chunk: corpus.chunks[n.position].clone(),
                distance: n.distance,
            })
            .collect())
    }

    /// Text of the `k` chunks nearest to the query, closest first.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> {
        Ok(self
            .search(query, k)?
            .into_iter()
            .map(|r| r.chunk.content)
            .collect())
    }

    /// The current corpus, if a document has been ingested.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Corpus<I>>> {
        self.corpus.load_full()
    }

    /// Returns `true` once a document has been ingested.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.corpus.load().is_some()
    }

    /// Returns the number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.corpus.load().as_ref().map_or(0, |c| c.chunks.len())
    }

    /// Returns `true` if no chunks are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Returns a reference to the chunker.
    #[must_use]
    pub fn chunker(&self) -> &WordWindowChunker {
        &self.chunker
    }
}
