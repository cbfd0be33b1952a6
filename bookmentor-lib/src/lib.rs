//! BookMentor - RAG library for grounding exercises and answers in a book
//!
//! # Architecture
//!
//! ```text
//! Document -> Extractor -> Chunker -> Embedder -> Index
//!                                                   |
//! Query -> Embedder -> Retriever <------------------+
//!                         |
//!                      assemble -> prompt -> Generator
//! ```
//!
//! # Example
//!
//! ```ignore
//! use bookmentor_lib::{chunk::WordWindowChunker, embed::MiniLmEmbedder, retrieve::Retriever};
//!
//! let retriever = Retriever::new(MiniLmEmbedder::new()?, WordWindowChunker::default());
//!
//! // Index a book
//! let outcome = retriever.ingest_outcome(&std::fs::read("biology.pdf")?);
//! println!("{}", outcome.message);
//!
//! // Retrieve passages, closest first
//! let passages = retriever.retrieve("How do cells divide?", 5)?;
//! let context = bookmentor_lib::context::assemble(&passages);
//! ```

pub mod chunk;
pub mod config;
pub mod context;
pub mod embed;
pub mod error;
pub mod exercise;
pub mod extract;
pub mod generate;
pub mod index;
pub mod retrieve;

pub use config::Config;
pub use error::{Error, Result};
