//! Text extraction from uploaded documents
//!
//! An extractor turns the raw bytes of one document into a single string,
//! pages concatenated in reading order with no page markers.
//!
//! ```ignore
//! use bookmentor_lib::extract::{PdfExtractor, TextExtractor};
//!
//! let text = PdfExtractor.extract(&std::fs::read("book.pdf")?)?;
//! ```

use crate::Result;

/// Trait for document text extractors
pub trait TextExtractor: Send + Sync {
    /// Extract the full text of a document.
    ///
    /// Fails with [`Error::Extraction`](crate::Error::Extraction) when the
    /// bytes are not a readable document or contain no text.
    fn extract(&self, document: &[u8]) -> Result<String>;

    /// Returns the name of the format this extractor reads
    fn format(&self) -> &str;
}

impl<T: TextExtractor + ?Sized> TextExtractor for Box<T> {
    fn extract(&self, document: &[u8]) -> Result<String> {
        (**self).extract(document)
    }

    fn format(&self) -> &str {
        (**self).format()
    }
}

mod pdf;
mod plain;

pub use pdf::*;
pub use plain::*;

#[cfg(test)]
pub(crate) use pdf::tests::make_pdf;
