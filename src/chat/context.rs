//! Turning turns and documents into the bounded message list sent upstream.

use crate::docs::ExtractionResult;
use crate::llm::{Message, Role};

use super::turn::ConversationTurn;

/// Appended to a preview that was cut short.
pub const ELLIPSIS: &str = "...";

/// First `limit` characters of `text`, with [`ELLIPSIS`] when anything was cut.
pub fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Short description of an attached document. Only the preview of its text
/// is included, never the full extraction.
pub fn summary_block(extraction: &ExtractionResult, preview_chars: usize) -> String {
    let mut block = format!("[Attached document: {}]\n", extraction.source_name);
    if let Some(title) = extraction.metadata_text("Title") {
        block.push_str(&format!("Title: {}\n", title));
    }
    if extraction.processed_page_count < extraction.total_page_count {
        block.push_str(&format!(
            "Pages: {} (first {} processed)\n",
            extraction.total_page_count, extraction.processed_page_count
        ));
    } else {
        block.push_str(&format!("Pages: {}\n", extraction.total_page_count));
    }
    if extraction.truncated {
        block.push_str(
            "Warning: the document is large and was truncated; only part of its text was extracted.\n",
        );
    }
    block.push_str("Extracted text preview:\n");
    block.push_str(&preview(&extraction.text, preview_chars));
    block
}

/// Content of a user message: the typed text followed by the document
/// summary, if any.
pub fn user_content(
    text: &str,
    extraction: Option<&ExtractionResult>,
    preview_chars: usize,
) -> String {
    match extraction {
        None => text.to_string(),
        Some(extraction) if text.trim().is_empty() => summary_block(extraction, preview_chars),
        Some(extraction) => format!("{}\n\n{}", text, summary_block(extraction, preview_chars)),
    }
}

/// The most recent `size` turns. Anything older is dropped.
pub fn window(history: &[ConversationTurn], size: usize) -> &[ConversationTurn] {
    &history[history.len().saturating_sub(size)..]
}

pub fn to_message(turn: &ConversationTurn, preview_chars: usize) -> Message {
    let content = match turn.role {
        Role::User => user_content(&turn.text, turn.extraction.as_ref(), preview_chars),
        Role::Assistant => turn.text.clone(),
    };
    Message {
        role: turn.role,
        content,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::docs::types::MetadataValue;

    fn extraction(text: &str, total: usize, processed: usize, truncated: bool) -> ExtractionResult {
        ExtractionResult {
            document_id: "abc".to_string(),
            source_name: "report.pdf".to_string(),
            total_page_count: total,
            processed_page_count: processed,
            text: text.to_string(),
            metadata: BTreeMap::new(),
            truncated,
        }
    }

    #[test]
    fn test_preview_long_text_is_cut_with_ellipsis() {
        let text = "a".repeat(1000);
        let out = preview(&text, 500);
        assert_eq!(out, format!("{}{}", "a".repeat(500), ELLIPSIS));
    }

    #[test]
    fn test_preview_short_text_unmodified() {
        let text = "b".repeat(300);
        assert_eq!(preview(&text, 500), text);
    }

    #[test]
    fn test_preview_exact_limit_unmodified() {
        let text = "c".repeat(500);
        assert_eq!(preview(&text, 500), text);
    }

    #[test]
    fn test_preview_multibyte_boundary() {
        let text = "ñ".repeat(600);
        let out = preview(&text, 500);
        assert_eq!(out.chars().count(), 500 + ELLIPSIS.len());
    }

    #[test]
    fn test_summary_block_without_truncation() {
        let block = summary_block(&extraction("hello world", 2, 2, false), 500);
        assert!(block.contains("report.pdf"));
        assert!(block.contains("Pages: 2\n"));
        assert!(!block.contains("Warning"));
        assert!(block.ends_with("hello world"));
    }

    #[test]
    fn test_summary_block_with_truncation_and_title() {
        let mut ex = extraction("body", 15, 10, true);
        ex.metadata
            .insert("Title".to_string(), MetadataValue::Text("Annual".to_string()));
        let block = summary_block(&ex, 500);
        assert!(block.contains("Title: Annual"));
        assert!(block.contains("Pages: 15 (first 10 processed)"));
        assert!(block.contains("Warning: the document is large and was truncated"));
    }

    #[test]
    fn test_summary_never_forwards_full_text() {
        let full = "z".repeat(8000);
        let block = summary_block(&extraction(&full, 3, 3, false), 500);
        assert!(!block.contains(&full));
        assert!(block.contains(&format!("{}{}", "z".repeat(500), ELLIPSIS)));
    }

    #[test]
    fn test_user_content_document_only() {
        let ex = extraction("text", 1, 1, false);
        let content = user_content("   ", Some(&ex), 500);
        assert!(content.starts_with("[Attached document: report.pdf]"));
    }

    #[test]
    fn test_user_content_text_then_summary() {
        let ex = extraction("text", 1, 1, false);
        let content = user_content("Summarise this", Some(&ex), 500);
        assert!(content.starts_with("Summarise this\n\n[Attached document"));
        assert_eq!(user_content("plain", None, 500), "plain");
    }

    #[test]
    fn test_window_keeps_most_recent() {
        let history: Vec<ConversationTurn> = (0..10)
            .map(|i| ConversationTurn::user(format!("turn {}", i), None))
            .collect();
        let kept = window(&history, 4);
        assert_eq!(kept.len(), 4);
        assert_eq!(kept[0].text, "turn 6");
        assert_eq!(kept[3].text, "turn 9");
        assert_eq!(window(&history[..2], 4).len(), 2);
    }

    #[test]
    fn test_to_message_renders_prior_document() {
        let turn = ConversationTurn::user("look", Some(extraction("inside", 1, 1, false)));
        let msg = to_message(&turn, 500);
        assert_eq!(msg.role, Role::User);
        assert!(msg.content.contains("inside"));

        let reply = to_message(&ConversationTurn::assistant("done"), 500);
        assert_eq!(reply.content, "done");
    }
}
