//! Document chunking
//!
//! A chunk is a window of whitespace-delimited words. Consecutive windows
//! overlap so that a passage cut at a window edge still appears whole in
//! one of its neighbours.
//!
//! # Usage
//!
//! ```ignore
//! use bookmentor_lib::chunk::WordWindowChunker;
//!
//! let chunker = WordWindowChunker::new(300, 50)?;
//! let chunks = chunker.chunk(&text);
//! ```

use serde::{Deserialize, Serialize};

/// A chunk of text with its metadata
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Chunk {
    /// Content hash of this chunk
    pub id: String,
    /// The text content of this chunk
    pub content: String,
    /// Metadata about the source and position
    pub metadata: ChunkMetadata,
}

/// Metadata associated with a chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct ChunkMetadata {
    /// Source document identifier
    pub source_id: Option<String>,
    /// Position of the chunk in the chunk sequence (0-indexed)
    pub position: usize,
    /// First word of the window within the source token list
    pub start_token: usize,
    /// One past the last word of the window
    pub end_token: usize,
    /// Total number of chunks from this source
    pub total_chunks: Option<usize>,
}

mod window;

pub use window::*;
