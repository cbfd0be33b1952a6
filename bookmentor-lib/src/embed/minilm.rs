use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;

use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// Output dimension of all-MiniLM-L6-v2
pub const MINILM_DIMENSION: usize = 384;

/// MiniLM embedder using sentence-transformers/all-MiniLM-L6-v2.
///
/// Uses fastembed for ONNX-based inference. The session needs exclusive
/// access while running, so calls from several threads queue on a lock.
pub struct MiniLmEmbedder {
    model: Mutex<TextEmbedding>,
    batch_size: Option<usize>,
}

impl MiniLmEmbedder {
    /// Create a new MiniLM embedder.
    ///
    /// Downloads the model on first use (~90MB).
    pub fn new() -> Result<Self> {
        let opts = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_show_download_progress(true);

        TextEmbedding::try_new(opts)
            .map(|model| Self {
                model: Mutex::new(model),
                batch_size: None,
            })
            .map_err(|e| Error::EmbeddingProvider(e.to_string()))
    }

    /// Set how many texts go through the model per forward pass.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size.max(1));
        self
    }
}

impl Embedder for MiniLmEmbedder {
    fn model_name(&self) -> &str {
        "sentence-transformers/all-MiniLM-L6-v2"
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }

    fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self
            .model
            .lock()
            .embed(texts, self.batch_size)
            .map_err(|e| Error::EmbeddingProvider(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(Error::EmbeddingProvider(format!(
                "model returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }
        Ok(embeddings)
    }
}
