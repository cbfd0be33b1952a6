use std::hash::{DefaultHasher, Hash, Hasher};

use tracing::warn;

use crate::chunk::{Chunk, ChunkMetadata};
use crate::{Error, Result};

/// Default window length in words
pub const DEFAULT_CHUNK_SIZE: usize = 300;

/// Default number of words shared by consecutive windows
pub const DEFAULT_OVERLAP: usize = 50;

/// Word-window chunker - splits on whitespace into fixed-size word windows
///
/// Windows start every `chunk_size - overlap` words. The last window may be
/// shorter than `chunk_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordWindowChunker {
    chunk_size: usize,
    overlap: usize,
}

impl WordWindowChunker {
    /// Create a chunker emitting `chunk_size`-word windows that share
    /// `overlap` words with their predecessor.
    ///
    /// An overlap that is not smaller than `chunk_size` would never advance,
    /// so the stride is clamped to one word in that case.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidInput("chunk_size must be positive".to_string()));
        }
        if overlap >= chunk_size {
            warn!(
                chunk_size,
                overlap,
                "overlap is not smaller than chunk size, clamping stride to 1"
            );
        }
        Ok(Self { chunk_size, overlap })
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Number of words between the starts of consecutive windows (at least 1).
    #[must_use]
    pub fn stride(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap).max(1)
    }

    /// Split content into chunks with default metadata.
    #[must_use]
    pub fn chunk(&self, content: &str) -> Vec<Chunk> {
        self.chunk_with(content, ChunkMetadata::default())
    }

    /// Split content into chunks, attaching `metadata` to each one.
    #[must_use]
    pub fn chunk_with(&self, content: &str, mut metadata: ChunkMetadata) -> Vec<Chunk> {
        let words: Vec<&str> = content.split_whitespace().collect();
        let windows = self.windows(words.len());

        // set common chunking related metadata
        metadata.total_chunks = Some(windows.len());

        windows
            .into_iter()
            .enumerate()
            .map(|(position, (start, end))| {
                let text = words[start..end].join(" ");

                let mut m = metadata.clone();
                m.position = position;
                m.start_token = start;
                m.end_token = end;

                Chunk {
                    id: generate_id(&text),
                    content: text,
                    metadata: m,
                }
            })
            .collect()
    }

    /// Token ranges of every window over `len` words.
    ///
    /// Stops at the first window that reaches the end, so no emitted window
    /// is contained entirely in its predecessor. Starting a window at every
    /// stride offset below `len` would instead add tail windows that only
    /// repeat words already covered: 300 words at 300/50 is one window here,
    /// not two.
    fn windows(&self, len: usize) -> Vec<(usize, usize)> {
        let mut windows = Vec::with_capacity(len.div_ceil(self.stride()));
        let mut start = 0;
        while start < len {
            let end = (start + self.chunk_size).min(len);
            windows.push((start, end));
            if end == len {
                break;
            }
            start += self.stride();
        }
        windows
    }
}

impl Default for WordWindowChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

fn generate_id(string: &str) -> String {
    let mut hasher = DefaultHasher::new();
    string.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    /// Rebuild the token list from chunks by dropping each window's overlap
    /// with its predecessor.
    fn reconstruct(chunks: &[Chunk]) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        let mut covered = 0;
        for chunk in chunks {
            let skip = covered - chunk.metadata.start_token;
            tokens.extend(chunk.content.split(' ').skip(skip).map(str::to_string));
            covered = chunk.metadata.end_token;
        }
        tokens
    }

    #[test]
    fn test_basic_chunking() {
        let chunker = WordWindowChunker::new(3, 0).unwrap();
        let chunks = chunker.chunk("a b c d e f");

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "a b c");
        assert_eq!(chunks[1].content, "d e f");
    }

    #[test]
    fn test_overlap() {
        let chunker = WordWindowChunker::new(4, 2).unwrap();
        let chunks = chunker.chunk("a b c d e f g");

        // stride=2, so starts: 0, 2, 4
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content, "a b c d");
        assert_eq!(chunks[1].content, "c d e f");
        assert_eq!(chunks[2].content, "e f g"); // truncated
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let chunker = WordWindowChunker::new(10, 0).unwrap();
        let chunks = chunker.chunk("  one\ttwo\n\nthree   four \r\n");

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "one two three four");
    }

    #[test]
    fn test_thousand_words() {
        let chunker = WordWindowChunker::new(300, 50).unwrap();
        let chunks = chunker.chunk(&words(1000));

        let ranges: Vec<_> = chunks
            .iter()
            .map(|c| (c.metadata.start_token, c.metadata.end_token))
            .collect();
        assert_eq!(ranges, vec![(0, 300), (250, 550), (500, 800), (750, 1000)]);

        let last = chunks.last().unwrap();
        assert_eq!(last.content.split(' ').count(), 250);
        assert!(chunks.iter().all(|c| c.metadata.total_chunks == Some(4)));
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.position, i);
        }
    }

    #[test]
    fn test_coverage_reconstructs_tokens() {
        let text = words(137);
        let expected: Vec<String> = text.split_whitespace().map(str::to_string).collect();

        for (size, overlap) in [(1, 0), (10, 0), (10, 3), (10, 9), (50, 49), (200, 10)] {
            let chunker = WordWindowChunker::new(size, overlap).unwrap();
            let chunks = chunker.chunk(&text);
            assert_eq!(reconstruct(&chunks), expected, "size={size} overlap={overlap}");
        }
    }

    #[test]
    fn test_no_trailing_contained_window() {
        // exactly one window's worth: a second window at 250 would be redundant
        let chunker = WordWindowChunker::new(300, 50).unwrap();
        let chunks = chunker.chunk(&words(300));
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_overlap_not_smaller_than_size_clamps_stride() {
        let chunker = WordWindowChunker::new(3, 5).unwrap();
        assert_eq!(chunker.stride(), 1);

        let chunks = chunker.chunk("a b c d e");
        let contents: Vec<_> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["a b c", "b c d", "c d e"]);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(matches!(
            WordWindowChunker::new(0, 0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_deterministic() {
        let chunker = WordWindowChunker::default();
        let text = words(777);
        assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    #[test]
    fn test_same_content_same_id() {
        let chunker = WordWindowChunker::new(2, 0).unwrap();
        let chunks = chunker.chunk("x y x y a b");

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].id, chunks[1].id); // same content = same hash
        assert_ne!(chunks[0].id, chunks[2].id);
    }

    #[test]
    fn test_source_metadata_is_kept() {
        let chunker = WordWindowChunker::new(2, 0).unwrap();
        let base = ChunkMetadata {
            source_id: Some("book.pdf".to_string()),
            ..ChunkMetadata::default()
        };
        let chunks = chunker.chunk_with("a b c", base);

        assert!(chunks
            .iter()
            .all(|c| c.metadata.source_id.as_deref() == Some("book.pdf")));
    }

    #[test]
    fn test_empty_content() {
        let chunker = WordWindowChunker::default();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk(" \n\t ").is_empty());
    }

    #[test]
    fn test_no_tail_window_inside_predecessor() {
        let chunker = WordWindowChunker::new(300, 50).unwrap();
        let text = (0..300).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");

        let chunks = chunker.chunk(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!((chunks[0].metadata.start_token, chunks[0].metadata.end_token), (0, 300));
    }
}
