use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const MIME_PDF: &str = "application/pdf";

/// A document handed over by the host, before any parsing.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub name: String,
    /// Content type declared by whoever supplied the bytes, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(name: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.map(|s| s.to_string()),
            bytes,
        }
    }
}

/// A document information entry: PDF info dictionaries hold strings and numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Number(f64),
}

/// Bounded text and metadata pulled from one uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Content-addressed id (blake3 hex of the uploaded bytes).
    pub document_id: String,
    pub source_name: String,
    pub total_page_count: usize,
    pub processed_page_count: usize,
    /// Page text joined by `\n`, capped, with the truncation marker when cut.
    pub text: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetadataValue>,
    /// Set when pages were skipped or the text cap was hit.
    pub truncated: bool,
}

impl ExtractionResult {
    pub fn metadata_text(&self, key: &str) -> Option<&str> {
        match self.metadata.get(key) {
            Some(MetadataValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}
