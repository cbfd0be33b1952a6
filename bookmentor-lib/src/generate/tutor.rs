use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::context::assemble;
use crate::embed::Embedder;
use crate::exercise::ExerciseRequest;
use crate::extract::TextExtractor;
use crate::generate::prompt::{
    exercise_prompt, fallback_prompt, multiple_choice_prompt, question_prompt, with_system,
    QA_SYSTEM_INSTRUCTION,
};
use crate::generate::{Generation, Generator};
use crate::index::VectorIndex;
use crate::retrieve::Retriever;
use crate::{Error, Result};

/// Chunks retrieved for an exercise request
pub const DEFAULT_EXERCISE_K: usize = 10;

/// Chunks retrieved for a question
pub const DEFAULT_QUESTION_K: usize = 5;

/// Answer given when the book has nothing to say about a question
pub const NO_RELEVANT_CONTENT: &str =
    "No relevant content found in the uploaded book for your question.";

/// Anything that can return the text of the chunks nearest to a query
pub trait ContextSource: Send + Sync + 'static {
    fn retrieve_context(&self, query: &str, k: usize) -> Result<Vec<String>>;
}

impl<E, X, I> ContextSource for Retriever<E, X, I>
where
    E: Embedder + 'static,
    X: TextExtractor + 'static,
    I: VectorIndex + 'static,
{
    fn retrieve_context(&self, query: &str, k: usize) -> Result<Vec<String>> {
        self.retrieve(query, k)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorSettings {
    pub exercise_k: usize,
    pub question_k: usize,
    /// Instruction sent with every exercise request
    pub system_instruction: Option<String>,
    /// Instruction prefixed to free-form chat messages
    pub mentor_instruction: Option<String>,
}

impl Default for TutorSettings {
    fn default() -> Self {
        Self {
            exercise_k: DEFAULT_EXERCISE_K,
            question_k: DEFAULT_QUESTION_K,
            system_instruction: None,
            mentor_instruction: None,
        }
    }
}

/// Generates exercises and answers grounded in the ingested book.
pub struct Tutor<S: ?Sized, G> {
    source: Arc<S>,
    generator: G,
    settings: TutorSettings,
}

impl<S: ContextSource + ?Sized, G: Generator> Tutor<S, G> {
    pub fn new(source: Arc<S>, generator: G) -> Self {
        Self::with_settings(source, generator, TutorSettings::default())
    }

    pub fn with_settings(source: Arc<S>, generator: G, settings: TutorSettings) -> Self {
        Self {
            source,
            generator,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &TutorSettings {
        &self.settings
    }

    #[must_use]
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Retrieval embeds the query on the CPU, so it runs off the async
    /// workers.
    async fn context(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let source = Arc::clone(&self.source);
        let query = query.to_string();
        tokio::task::spawn_blocking(move || source.retrieve_context(&query, k))
            .await
            .map_err(|e| Error::Task(e.to_string()))?
    }

    /// Generate exercises about the request topic from the book content.
    ///
    /// Falls back to [`generate_exercise_without_context`](Self::generate_exercise_without_context)
    /// when retrieval finds nothing.
    pub async fn generate_exercise(&self, request: &ExerciseRequest) -> Generation {
        let chunks = match self.context(&request.topic, self.settings.exercise_k).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(topic = %request.topic, error = %e, "retrieval failed");
                return Generation::Error(e.to_string());
            }
        };

        if chunks.is_empty() {
            info!(topic = %request.topic, "no book content, generating without context");
            return self.generate_exercise_without_context(request).await;
        }

        let context = assemble(&chunks);
        debug!(chunks = chunks.len(), context_chars = context.len(), "assembled exercise context");

        let prompt = if request.is_multiple_choice() {
            multiple_choice_prompt(request, &context)
        } else {
            exercise_prompt(request, &context)
        };
        self.generator
            .generate(self.settings.system_instruction.as_deref(), &prompt)
            .await
    }

    /// Generate exercises from the topic alone.
    pub async fn generate_exercise_without_context(&self, request: &ExerciseRequest) -> Generation {
        let prompt = with_system(
            self.settings.system_instruction.as_deref(),
            &fallback_prompt(request),
        );
        self.generator.generate(None, &prompt).await
    }

    /// Answer a question from the book content.
    pub async fn ask(&self, question: &str) -> Generation {
        let chunks = match self.context(question, self.settings.question_k).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(error = %e, "retrieval failed");
                return Generation::Error(e.to_string());
            }
        };

        if chunks.is_empty() {
            return Generation::Text(NO_RELEVANT_CONTENT.to_string());
        }

        let prompt = with_system(
            Some(QA_SYSTEM_INSTRUCTION),
            &question_prompt(question, &assemble(&chunks)),
        );
        self.generator.generate(None, &prompt).await
    }

    /// Reply to a free-form chat message. The book is not consulted.
    pub async fn chat(&self, message: &str) -> Generation {
        let prompt = with_system(self.settings.mentor_instruction.as_deref(), message);
        self.generator.generate(None, &prompt).await
    }
}
