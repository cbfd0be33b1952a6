//! Text embedding
//!
//! Chunks and queries go through the same encoder, so distances between a
//! query vector and chunk vectors are comparable.
//!
//! # Providers
//!
//! - [`MiniLmEmbedder`]: sentence-transformers/all-MiniLM-L6-v2 via the
//!   fastembed crate (ONNX runtime), 384 dimensions.
//! - [`HashingEmbedder`]: deterministic feature hashing over word tokens.
//!   No model download; useful offline and in tests.
//!
//! # Usage
//!
//! ```ignore
//! use bookmentor_lib::embed::{Embedder, MiniLmEmbedder};
//!
//! let embedder = MiniLmEmbedder::new()?;
//!
//! let doc_embeddings = embedder.embed_documents(&["Chapter one...", "Chapter two..."])?;
//! let query_embedding = embedder.embed_query("What is osmosis?")?;
//! ```

use crate::{Error, Result};

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
pub trait Embedder: Send + Sync {
    /// Embed multiple documents for indexing
    ///
    /// Returns one vector per input, in input order. Documents may be
    /// batched for efficiency; batching never changes the vectors.
    fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Embed a single query for searching
    ///
    /// Uses the document encoder unchanged.
    fn embed_query(&self, text: &str) -> Result<Embedding> {
        self.embed_documents(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::EmbeddingProvider("model returned no embeddings".to_string()))
    }

    /// Returns the embedding dimension
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        (**self).embed_documents(texts)
    }

    fn embed_query(&self, text: &str) -> Result<Embedding> {
        (**self).embed_query(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

mod hashing;
mod minilm;

pub use hashing::*;
pub use minilm::*;
