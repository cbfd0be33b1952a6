//! BookMentor CLI - index a book and generate grounded exercises
//!
//! # Commands
//!
//! ```bash
//! # Show the text extracted from a book
//! bookmentor extract biology.pdf
//!
//! # Chunk a book and show results
//! bookmentor chunk --size 300 --overlap 50 biology.pdf
//!
//! # Embed text and show vector stats
//! bookmentor embed "What is osmosis?"
//!
//! # Index a book and search it
//! bookmentor search biology.pdf "cell division" -k 3
//!
//! # Ask a question or generate exercises (needs GEMINI_API_KEY)
//! bookmentor ask biology.pdf "What is osmosis?"
//! bookmentor exercise biology.pdf "photosynthesis" --kind tf --count 10
//!
//! # Chat with the mentor, no book involved
//! bookmentor chat "How should I plan my revision?"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use bookmentor_lib::{
    chunk::{ChunkMetadata, WordWindowChunker},
    config::EmbeddingBackend,
    embed::{Embedder, HashingEmbedder},
    exercise::{interpret, ExerciseRequest},
    extract::{PdfExtractor, PlainTextExtractor, TextExtractor},
    generate::{GeminiGenerator, Generation, Tutor},
    retrieve::Retriever,
    Config,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type BookRetriever = Retriever<Box<dyn Embedder>, Box<dyn TextExtractor>>;

#[derive(Parser)]
#[command(name = "bookmentor")]
#[command(about = "Generate exercises and answers grounded in a book")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Embedding backend, overrides the config file
    #[arg(long, global = true, value_enum)]
    embedder: Option<EmbedderArg>,

    /// Gemini API key
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// System instruction sent with exercise requests
    #[arg(long, global = true, env = "EXERCISE_SYSTEM_INSTRUCTION")]
    system_instruction: Option<String>,

    /// System instruction prefixed to mentor chat messages
    #[arg(long, global = true, env = "MENTOR_SYSTEM_INSTRUCTION")]
    mentor_instruction: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum EmbedderArg {
    Minilm,
    Hashing,
}

impl From<EmbedderArg> for EmbeddingBackend {
    fn from(arg: EmbedderArg) -> Self {
        match arg {
            EmbedderArg::Minilm => EmbeddingBackend::MiniLm,
            EmbedderArg::Hashing => EmbeddingBackend::Hashing,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the text of a document
    Extract {
        /// Input file (.pdf or plain text)
        input: PathBuf,

        /// Characters of text to preview
        #[arg(long, default_value = "500")]
        preview: usize,
    },

    /// Chunk a document into overlapping word windows
    Chunk {
        /// Input file to chunk
        input: PathBuf,

        /// Words per chunk
        #[arg(long)]
        size: Option<usize>,

        /// Words shared by consecutive chunks
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Embed text and show vector info
    Embed {
        /// Text to embed
        text: String,

        /// Embed as a query rather than a document
        #[arg(short, long)]
        query: bool,
    },

    /// Index a document and search it
    Search {
        /// Input file to index
        input: PathBuf,

        /// Query to search for
        query: String,

        /// Number of results to return
        #[arg(short, long, default_value = "3")]
        k: usize,
    },

    /// Index a document and answer a question about it
    Ask {
        /// Input file to index
        input: PathBuf,

        /// Question to answer
        question: String,
    },

    /// Index a document and generate exercises about a topic
    Exercise {
        /// Input file to index
        input: PathBuf,

        /// Topic of the exercises
        topic: String,

        /// Exercise type, e.g. "mcq", "tf", "short answer", "blanks"
        #[arg(long, default_value = "mcq")]
        kind: String,

        /// Number of questions
        #[arg(long, default_value = "5")]
        count: u32,

        /// Difficulty level
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// Skip the book and generate from the topic alone
        #[arg(long)]
        no_context: bool,
    },

    /// Chat with the mentor without consulting a book
    Chat {
        /// Message to send
        message: String,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(embedder) = cli.embedder {
        config.embedding.backend = embedder.into();
    }
    if let Some(api_key) = &cli.api_key {
        config.generation.api_key = Some(api_key.clone());
    }
    if let Some(instruction) = &cli.system_instruction {
        config.generation.system_instruction = Some(instruction.clone());
    }
    if let Some(instruction) = &cli.mentor_instruction {
        config.generation.mentor_system_instruction = Some(instruction.clone());
    }
    config.validate()?;
    Ok(config)
}

fn is_pdf(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn extractor_for(path: &Path) -> Box<dyn TextExtractor> {
    if is_pdf(path) {
        Box::new(PdfExtractor)
    } else {
        Box::new(PlainTextExtractor)
    }
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(extractor_for(path).extract(&bytes)?)
}

fn build_embedder(config: &Config) -> Result<Box<dyn Embedder>> {
    if config.embedding.backend == EmbeddingBackend::MiniLm {
        println!("Loading MiniLM model (first run downloads ~90MB)...");
    }
    Ok(config.embedding.build()?)
}

/// Build a retriever and index `input` with it, off the async runtime and
/// within the configured time limit.
async fn index_book(config: &Config, input: &Path) -> Result<Arc<BookRetriever>> {
    let retriever: Arc<BookRetriever> = Arc::new(Retriever::with_extractor(
        build_embedder(config)?,
        extractor_for(input),
        config.chunker()?,
    ));

    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    println!("Indexing '{}'...", input.display());

    let task = tokio::task::spawn_blocking({
        let retriever = Arc::clone(&retriever);
        move || retriever.ingest_outcome(&bytes)
    });
    let outcome = tokio::time::timeout(config.ingest_timeout(), task)
        .await
        .map_err(|_| anyhow!("indexing timed out after {}s", config.ingest_timeout_secs))??;

    if !outcome.is_success() {
        bail!("indexing failed: {}", outcome.message);
    }
    println!("{}", outcome.message);
    Ok(retriever)
}

/// A retriever that never gets a document, for requests that skip the book.
/// Nothing is embedded, so the cheap embedder is enough.
fn unindexed_retriever(config: &Config) -> Result<Arc<BookRetriever>> {
    Ok(Arc::new(Retriever::with_extractor(
        Box::new(HashingEmbedder::default()) as Box<dyn Embedder>,
        Box::new(PlainTextExtractor) as Box<dyn TextExtractor>,
        config.chunker()?,
    )))
}

fn tutor(
    config: &Config,
    retriever: Arc<BookRetriever>,
) -> Result<Tutor<BookRetriever, GeminiGenerator>> {
    let generator = GeminiGenerator::from_config(&config.generation)
        .context("set GEMINI_API_KEY or generation.api_key")?;
    Ok(Tutor::with_settings(retriever, generator, config.tutor_settings()))
}

fn preview(text: &str, limit: usize) -> String {
    let mut preview: String = text.chars().take(limit).collect();
    if text.chars().count() > limit {
        preview.push_str("...");
    }
    preview
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Extract { input, preview: limit } => {
            let bytes = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let pages = if is_pdf(&input) {
                PdfExtractor.extract_pages(&bytes)?
            } else {
                vec![PlainTextExtractor.extract(&bytes)?]
            };
            let text = pages.concat();
            if text.trim().is_empty() {
                bail!("'{}' contains no extractable text", input.display());
            }

            println!(
                "Extracted {} pages, {} characters from '{}':\n",
                pages.len(),
                text.chars().count(),
                input.display()
            );
            println!("{}", preview(&text, limit));
        }

        Commands::Chunk { input, size, overlap } => {
            let text = read_text(&input)?;
            let chunker = WordWindowChunker::new(
                size.unwrap_or(config.chunking.chunk_size),
                overlap.unwrap_or(config.chunking.overlap),
            )?;
            let metadata = ChunkMetadata {
                source_id: Some(input.display().to_string()),
                ..ChunkMetadata::default()
            };
            let chunks = chunker.chunk_with(&text, metadata);

            println!(
                "Chunked '{}' into {} chunks ({} words, {} overlap):\n",
                input.display(),
                chunks.len(),
                chunker.chunk_size(),
                chunker.overlap()
            );
            for chunk in &chunks {
                let id: String = chunk.id.chars().take(8).collect();
                println!(
                    "--- Chunk {} (words {}..{}, id: {id}) ---",
                    chunk.metadata.position + 1,
                    chunk.metadata.start_token,
                    chunk.metadata.end_token
                );
                println!("{}\n", preview(&chunk.content, 200));
            }
        }

        Commands::Embed { text, query } => {
            let embedder = build_embedder(&config)?;

            let embedding = if query {
                println!("Embedding as query: {text}");
                embedder.embed_query(&text)?
            } else {
                println!("Embedding as document: {text}");
                embedder
                    .embed_documents(&[text.as_str()])?
                    .into_iter()
                    .next()
                    .context("model returned no embedding")?
            };

            println!("\nEmbedding stats ({}):", embedder.model_name());
            println!("  Dimensions: {}", embedding.len());
            println!("  First 5 values: {:?}", embedding.iter().take(5).collect::<Vec<_>>());
            println!("  Min: {:.4}", embedding.iter().cloned().fold(f32::INFINITY, f32::min));
            println!("  Max: {:.4}", embedding.iter().cloned().fold(f32::NEG_INFINITY, f32::max));
        }

        Commands::Search { input, query, k } => {
            let retriever = index_book(&config, &input).await?;

            println!("\nSearching: '{query}' (k={k})");
            let results = retriever.search(&query, k)?;

            println!("\n=== Results ===\n");
            for (i, result) in results.iter().enumerate() {
                println!(
                    "#{} (distance: {:.4}, chunk {})",
                    i + 1,
                    result.distance,
                    result.chunk.metadata.position + 1
                );
                println!("---");
                println!("{}\n", preview(&result.chunk.content, 300));
            }
        }

        Commands::Ask { input, question } => {
            let retriever = index_book(&config, &input).await?;
            let tutor = tutor(&config, retriever)?;

            match tutor.ask(&question).await {
                Generation::Text(answer) => println!("\n{answer}"),
                Generation::Error(message) => bail!("generation failed: {message}"),
            }
        }

        Commands::Exercise {
            input,
            topic,
            kind,
            count,
            difficulty,
            no_context,
        } => {
            let request = ExerciseRequest::new(topic)
                .with_type(kind)
                .with_count(count)
                .with_difficulty(difficulty);
            if request.kind().is_none() {
                warn!(
                    exercise_type = %request.exercise_type,
                    "unknown exercise type, output will not be parsed"
                );
            }

            let generation = if no_context {
                tutor(&config, unindexed_retriever(&config)?)?
                    .generate_exercise_without_context(&request)
                    .await
            } else {
                let retriever = index_book(&config, &input).await?;
                tutor(&config, retriever)?.generate_exercise(&request).await
            };

            let text = generation
                .into_result()
                .map_err(|message| anyhow!("generation failed: {message}"))?;
            let exercises = interpret(request.kind(), &text);
            info!(kind = ?request.kind(), "interpreted exercise response");
            println!("{}", serde_json::to_string_pretty(&exercises)?);
        }

        Commands::Chat { message } => {
            let tutor = tutor(&config, unindexed_retriever(&config)?)?;
            match tutor.chat(&message).await {
                Generation::Text(response) => println!("{response}"),
                Generation::Error(message) => bail!("generation failed: {message}"),
            }
        }
    }

    Ok(())
}
