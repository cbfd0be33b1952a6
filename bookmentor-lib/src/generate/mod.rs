//! Text generation on top of retrieval
//!
//! ```text
//! topic / question -> Retriever -> assemble -> prompt -> Generator
//!                                                           |
//!                                                       Generation
//! ```
//!
//! A [`Generator`] never fails with an error: whatever happens on the
//! provider side comes back as a [`Generation`] value, so callers relay it
//! without inspecting provider payloads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod gemini;
pub mod prompt;
mod tutor;

pub use gemini::*;
pub use tutor::*;

/// Result of one generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    /// Generated text
    Text(String),
    /// Why no text was generated
    Error(String),
}

impl Generation {
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Generation::Text(_))
    }

    /// The generated text, if any
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Generation::Text(text) => Some(text),
            Generation::Error(_) => None,
        }
    }

    /// Convert into a `Result`, with the error message as the error.
    pub fn into_result(self) -> std::result::Result<String, String> {
        match self {
            Generation::Text(text) => Ok(text),
            Generation::Error(message) => Err(message),
        }
    }
}

/// Trait for generative text providers
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for a prompt, optionally steered by a system instruction.
    async fn generate(&self, system: Option<&str>, prompt: &str) -> Generation;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}
