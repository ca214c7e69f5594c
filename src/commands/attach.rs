use std::path::Path;

use aichat::docs::types::MIME_PDF;
use aichat::docs::DocumentUpload;
use anyhow::{Context, Result};

use super::Host;

/// Read a file from disk and stage it for the next message.
pub async fn attach(host: &mut Host, path: &str) -> Result<()> {
    let path = Path::new(path);
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let size_kb = bytes.len() / 1024;

    host.staged = Some(DocumentUpload::new(
        name.clone(),
        content_type_for(path),
        bytes,
    ));
    println!(
        "Attached {} ({} KB). It will be sent with your next message.",
        name, size_kb
    );
    Ok(())
}

pub fn detach(host: &mut Host) {
    match host.staged.take() {
        Some(upload) => println!("Removed {}.", upload.name),
        None => println!("Nothing is attached."),
    }
}

/// Declared type from the file extension; unknown extensions declare nothing
/// and are left to content sniffing.
fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(MIME_PDF),
        "txt" | "md" => Some("text/plain"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_extensions() {
        assert_eq!(content_type_for(Path::new("a/Report.PDF")), Some(MIME_PDF));
        assert_eq!(content_type_for(Path::new("notes.md")), Some("text/plain"));
        assert_eq!(content_type_for(Path::new("scan")), None);
        assert_eq!(content_type_for(Path::new("archive.bin")), None);
    }
}
