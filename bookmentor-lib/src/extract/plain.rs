use crate::extract::TextExtractor;
use crate::{Error, Result};

/// UTF-8 text extractor for `.txt` and similar sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn format(&self) -> &str {
        "text"
    }

    fn extract(&self, document: &[u8]) -> Result<String> {
        let text = std::str::from_utf8(document).map_err(|e| Error::malformed(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(Error::empty_document("document is blank"));
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionKind;

    #[test]
    fn test_passes_text_through() {
        let text = PlainTextExtractor.extract("Cells divide.\n\nMitosis.".as_bytes()).unwrap();
        assert_eq!(text, "Cells divide.\n\nMitosis.");
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let err = PlainTextExtractor.extract(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, Error::Extraction { kind: ExtractionKind::Malformed, .. }));
    }

    #[test]
    fn test_blank_is_empty() {
        let err = PlainTextExtractor.extract(b" \n ").unwrap_err();
        assert!(matches!(err, Error::Extraction { kind: ExtractionKind::Empty, .. }));
    }
}
