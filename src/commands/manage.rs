use aichat::llm::Role;

use super::Host;

/// Start over: forget the conversation and any staged document.
pub async fn clear(host: &mut Host) {
    host.session.clear().await;
    host.staged = None;
    println!("Conversation cleared.");
}

pub async fn history(host: &mut Host) {
    let turns = host.session.turns().await;
    if turns.is_empty() {
        println!("No messages yet. Start by sending a message.");
        return;
    }

    for turn in &turns {
        let who = match turn.role {
            Role::User => "You",
            Role::Assistant => "AI Assistant",
        };
        println!("[{}] {}: {}", turn.created_at.format("%H:%M"), who, turn.text);
        if let Some(doc) = &turn.extraction {
            println!(
                "    (document: {}, {} of {} pages{})",
                doc.source_name,
                doc.processed_page_count,
                doc.total_page_count,
                if doc.truncated { ", truncated" } else { "" }
            );
        }
    }
}
