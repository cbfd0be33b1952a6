//! TOML configuration
//!
//! Every section is optional; a missing file section or key takes the
//! default shown here.
//!
//! ```toml
//! ingest_timeout_secs = 300
//!
//! [chunking]
//! chunk_size = 300
//! overlap = 50
//!
//! [retrieval]
//! exercise_k = 10
//! question_k = 5
//!
//! [embedding]
//! backend = "minilm"   # or "hashing"
//! dimension = 384      # hashing only
//!
//! [generation]
//! model = "gemini-2.0-flash"
//! timeout_secs = 60
//! # system_instruction = "..."         # exercise requests
//! # mentor_system_instruction = "..."  # chat messages
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chunk::{WordWindowChunker, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use crate::embed::{Embedder, HashingEmbedder, MiniLmEmbedder, DEFAULT_HASHING_DIMENSION};
use crate::generate::{
    TutorSettings, DEFAULT_EXERCISE_K, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
    DEFAULT_GENERATION_TIMEOUT_SECS, DEFAULT_QUESTION_K,
};
use crate::{Error, Result};

pub const DEFAULT_INGEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound on one document ingestion
    pub ingest_timeout_secs: u64,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ingest_timeout_secs: DEFAULT_INGEST_TIMEOUT_SECS,
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Words per chunk
    pub chunk_size: usize,
    /// Words shared by consecutive chunks
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub exercise_k: usize,
    pub question_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            exercise_k: DEFAULT_EXERCISE_K,
            question_k: DEFAULT_QUESTION_K,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// all-MiniLM-L6-v2 through fastembed
    MiniLm,
    /// Feature hashing, no model download
    Hashing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    /// Output size of the hashing backend
    pub dimension: usize,
    /// Texts per model forward pass; fastembed's default when unset
    pub batch_size: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::MiniLm,
            dimension: DEFAULT_HASHING_DIMENSION,
            batch_size: None,
        }
    }
}

impl EmbeddingConfig {
    /// Build the configured embedder.
    ///
    /// The MiniLM backend downloads its model on first use.
    pub fn build(&self) -> Result<Box<dyn Embedder>> {
        match self.backend {
            EmbeddingBackend::MiniLm => {
                let embedder = MiniLmEmbedder::new()?;
                Ok(Box::new(match self.batch_size {
                    Some(batch_size) => embedder.with_batch_size(batch_size),
                    None => embedder,
                }))
            }
            EmbeddingBackend::Hashing => Ok(Box::new(HashingEmbedder::new(self.dimension)?)),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    /// Instruction sent with exercise requests
    pub system_instruction: Option<String>,
    /// Instruction prefixed to mentor chat messages
    pub mentor_system_instruction: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            api_key: None,
            system_instruction: None,
            mentor_system_instruction: None,
            timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
        }
    }
}

// Keeps the API key out of logs
impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("system_instruction", &self.system_instruction)
            .field("mentor_system_instruction", &self.mentor_system_instruction)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be positive".to_string()));
        }
        if self.retrieval.exercise_k == 0 || self.retrieval.question_k == 0 {
            return Err(Error::Config("retrieval k values must be positive".to_string()));
        }
        if self.embedding.backend == EmbeddingBackend::Hashing && self.embedding.dimension == 0 {
            return Err(Error::Config("embedding.dimension must be positive".to_string()));
        }
        if self.ingest_timeout_secs == 0 || self.generation.timeout_secs == 0 {
            return Err(Error::Config("timeouts must be positive".to_string()));
        }
        Ok(())
    }

    pub fn chunker(&self) -> Result<WordWindowChunker> {
        WordWindowChunker::new(self.chunking.chunk_size, self.chunking.overlap)
    }

    #[must_use]
    pub fn tutor_settings(&self) -> TutorSettings {
        TutorSettings {
            exercise_k: self.retrieval.exercise_k,
            question_k: self.retrieval.question_k,
            system_instruction: self.generation.system_instruction.clone(),
            mentor_instruction: self.generation.mentor_system_instruction.clone(),
        }
    }

    #[must_use]
    pub fn ingest_timeout(&self) -> Duration {
        Duration::from_secs(self.ingest_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.chunking.chunk_size, 300);
        assert_eq!(config.retrieval.exercise_k, 10);
        assert_eq!(config.ingest_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
            ingest_timeout_secs = 30

            [chunking]
            overlap = 10

            [embedding]
            backend = "hashing"
            dimension = 64

            [generation]
            system_instruction = "You are a patient tutor."
            mentor_system_instruction = "You are a study mentor."
            "#,
        )
        .unwrap();

        assert_eq!(config.ingest_timeout_secs, 30);
        assert_eq!(config.chunking.chunk_size, 300);
        assert_eq!(config.chunking.overlap, 10);
        assert_eq!(config.embedding.backend, EmbeddingBackend::Hashing);
        assert_eq!(config.embedding.build().unwrap().dimension(), 64);
        assert_eq!(config.generation.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(
            config.tutor_settings().system_instruction.as_deref(),
            Some("You are a patient tutor.")
        );
        assert_eq!(
            config.tutor_settings().mentor_instruction.as_deref(),
            Some("You are a study mentor.")
        );
    }

    #[test]
    fn test_validation() {
        for toml in [
            "[chunking]\nchunk_size = 0",
            "[retrieval]\nquestion_k = 0",
            "[embedding]\nbackend = \"hashing\"\ndimension = 0",
            "ingest_timeout_secs = 0",
        ] {
            assert!(matches!(Config::from_toml_str(toml), Err(Error::Config(_))), "{toml}");
        }
    }

    #[test]
    fn test_unknown_backend_is_config_error() {
        let err = Config::from_toml_str("[embedding]\nbackend = \"word2vec\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retrieval]\nexercise_k = 4").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.retrieval.exercise_k, 4);
        assert_eq!(config.tutor_settings().question_k, 5);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(Config::load("/nonexistent/bookmentor.toml"), Err(Error::Io(_))));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = GenerationConfig {
            api_key: Some("secret-key".into()),
            ..GenerationConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
