use lopdf::Document;
use tracing::{debug, warn};

use crate::extract::TextExtractor;
use crate::{Error, Result};

/// PDF extractor backed by lopdf.
///
/// Pages whose text cannot be decoded are skipped; a document where every
/// page comes up empty is reported as having no text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Extract the text of each page, in page order.
    pub fn extract_pages(&self, document: &[u8]) -> Result<Vec<String>> {
        let doc = Document::load_mem(document).map_err(|e| Error::malformed(e.to_string()))?;

        let pages = doc.get_pages();
        debug!(pages = pages.len(), "parsed pdf");

        let mut texts = Vec::with_capacity(pages.len());
        for &number in pages.keys() {
            match doc.extract_text(&[number]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!(page = number, error = %e, "skipping page with undecodable text");
                    texts.push(String::new());
                }
            }
        }
        Ok(texts)
    }
}

impl TextExtractor for PdfExtractor {
    fn format(&self) -> &str {
        "pdf"
    }

    fn extract(&self, document: &[u8]) -> Result<String> {
        let pages = self.extract_pages(document)?;
        let text = pages.concat();

        if text.trim().is_empty() {
            return Err(Error::empty_document(format!(
                "no text found in {} page(s)",
                pages.len()
            )));
        }
        Ok(text)
    }
}
