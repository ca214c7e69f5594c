pub mod ingest;
pub mod types;

use std::collections::BTreeMap;

use lopdf::{Document, Object};

use crate::error::ChatError;
use types::MetadataValue;

pub use ingest::{extract, extract_with, ingest};
pub use types::{DocumentUpload, ExtractionResult};

/// Pages processed when the caller does not choose a ceiling.
pub const DEFAULT_PAGE_CEILING: usize = 10;
/// Characters of extracted text kept before truncating.
pub const TEXT_CAP: usize = 8000;
/// Appended to extracted text cut at [`TEXT_CAP`].
pub const TRUNCATION_MARKER: &str = "\n[... document text truncated ...]";

/// What the ingestion pipeline needs from a PDF parser. Pages are 1-based.
pub trait PdfParser {
    fn page_count(&self) -> usize;
    fn page_text(&self, page_number: usize) -> Result<String, ChatError>;
    fn metadata(&self) -> BTreeMap<String, MetadataValue>;
}

/// [`PdfParser`] backed by an in-memory lopdf document.
pub struct LopdfParser {
    doc: Document,
    /// Page numbers as stored in the page tree, in order.
    pages: Vec<u32>,
}

impl LopdfParser {
    pub fn load(bytes: &[u8]) -> Result<Self, ChatError> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| ChatError::ExtractionFailure(format!("failed to parse PDF: {e}")))?;
        let pages = doc.get_pages().keys().copied().collect();
        Ok(Self { doc, pages })
    }

    fn info_dictionary(&self) -> Option<&lopdf::Dictionary> {
        match self.doc.trailer.get(b"Info") {
            Ok(Object::Reference(id)) => self.doc.get_dictionary(*id).ok(),
            Ok(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        }
    }
}

impl PdfParser for LopdfParser {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page_number: usize) -> Result<String, ChatError> {
        let page = page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .ok_or_else(|| {
                ChatError::ExtractionFailure(format!("page {} does not exist", page_number))
            })?;
        self.doc.extract_text(&[*page]).map_err(|e| {
            ChatError::ExtractionFailure(format!("failed to read page {}: {e}", page_number))
        })
    }

    fn metadata(&self) -> BTreeMap<String, MetadataValue> {
        let mut out = BTreeMap::new();
        let Some(info) = self.info_dictionary() else {
            return out;
        };

        for (key, value) in info.iter() {
            let value = match value {
                Object::Reference(id) => match self.doc.get_object(*id) {
                    Ok(obj) => obj,
                    Err(_) => continue,
                },
                other => other,
            };
            let converted = match value {
                Object::String(bytes, _) => MetadataValue::Text(decode_pdf_string(bytes)),
                Object::Name(bytes) => MetadataValue::Text(String::from_utf8_lossy(bytes).into()),
                Object::Integer(i) => MetadataValue::Number(*i as f64),
                Object::Real(r) => MetadataValue::Number(f64::from(*r)),
                Object::Boolean(b) => MetadataValue::Text(b.to_string()),
                _ => continue,
            };
            if let MetadataValue::Text(s) = &converted {
                if s.trim().is_empty() {
                    continue;
                }
            }
            out.insert(String::from_utf8_lossy(key).into_owned(), converted);
        }
        out
    }
}

/// Decode a PDF text string: UTF-16BE when it carries a byte order mark,
/// otherwise PDFDocEncoding, read as Latin-1.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    bytes.iter().map(|&b| b as char).collect()
}
