use std::time::Duration;

use tracing::{debug, info};

use super::types::{DocumentUpload, ExtractionResult, MIME_PDF};
use super::{LopdfParser, PdfParser, TEXT_CAP, TRUNCATION_MARKER};
use crate::error::ChatError;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);
/// The `%PDF-` header must start within this many bytes.
const MAGIC_WINDOW: usize = 1024;

/// Validate an upload and extract its text on a blocking task.
pub async fn ingest(
    upload: &DocumentUpload,
    ceiling: usize,
) -> Result<ExtractionResult, ChatError> {
    check_format(upload)?;

    let bytes = upload.bytes.clone();
    let name = upload.name.clone();
    let result = tokio::time::timeout(
        EXTRACTION_TIMEOUT,
        tokio::task::spawn_blocking(move || extract(&bytes, &name, ceiling)),
    )
    .await
    .map_err(|_| ChatError::ExtractionFailure("PDF extraction timed out".to_string()))?
    .map_err(|e| ChatError::ExtractionFailure(format!("task join error: {e}")))??;

    info!(
        doc_id = %result.document_id,
        name = %result.source_name,
        pages = result.total_page_count,
        processed = result.processed_page_count,
        chars = result.text.chars().count(),
        truncated = result.truncated,
        "Document ingested"
    );
    Ok(result)
}

/// Parse `bytes` with lopdf and extract up to `ceiling` pages.
pub fn extract(
    bytes: &[u8],
    source_name: &str,
    ceiling: usize,
) -> Result<ExtractionResult, ChatError> {
    if !has_pdf_magic(bytes) {
        return Err(ChatError::UnsupportedFormat(format!(
            "{} is not a PDF",
            source_name
        )));
    }
    let parser = LopdfParser::load(bytes)?;
    let document_id = blake3::hash(bytes).to_hex().to_string();
    extract_with(&parser, document_id, source_name, ceiling)
}

/// Page walk shared by every parser: sequential pages, `\n` before each
/// non-blank page after the first, stop at the ceiling or as soon as the text
/// passes [`TEXT_CAP`].
pub fn extract_with(
    parser: &dyn PdfParser,
    document_id: String,
    source_name: &str,
    ceiling: usize,
) -> Result<ExtractionResult, ChatError> {
    let total_page_count = parser.page_count();
    if total_page_count == 0 {
        return Err(ChatError::ExtractionFailure(
            "document has no pages".to_string(),
        ));
    }

    let mut text = String::new();
    let mut char_count = 0usize;
    let mut processed_page_count = 0usize;
    let mut hit_cap = false;

    for page in 1..=total_page_count.min(ceiling) {
        let page_text = parser.page_text(page)?;
        let page_text = page_text.trim_end();
        // no separator before a blank page
        if page > 1 && !page_text.is_empty() {
            text.push('\n');
            char_count += 1;
        }
        text.push_str(page_text);
        char_count += page_text.chars().count();
        processed_page_count = page;
        debug!(page, chars = char_count, "Page extracted");

        if char_count > TEXT_CAP {
            let cut = text
                .char_indices()
                .nth(TEXT_CAP)
                .map(|(i, _)| i)
                .unwrap_or(text.len());
            text.truncate(cut);
            text.push_str(TRUNCATION_MARKER);
            hit_cap = true;
            break;
        }
    }

    Ok(ExtractionResult {
        document_id,
        source_name: source_name.to_string(),
        total_page_count,
        processed_page_count,
        text,
        metadata: parser.metadata(),
        truncated: hit_cap || processed_page_count < total_page_count,
    })
}

/// The magic bytes decide. The declared type only shapes the error message.
fn check_format(upload: &DocumentUpload) -> Result<(), ChatError> {
    if has_pdf_magic(&upload.bytes) {
        return Ok(());
    }
    let reason = match upload.content_type.as_deref() {
        Some(declared) if !is_pdf_mime(declared) => {
            format!("{} declared as {}", upload.name, declared)
        }
        _ => format!("{} is not a PDF", upload.name),
    };
    Err(ChatError::UnsupportedFormat(reason))
}

fn is_pdf_mime(declared: &str) -> bool {
    let mime = declared
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == MIME_PDF || mime == "application/x-pdf"
}

fn has_pdf_magic(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(MAGIC_WINDOW)];
    head.windows(5).any(|w| w == b"%PDF-")
}
