// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use folio_core::{
    Checklist, Content, FlashcardDeck, LibraryContentMetadata, PracticeGuide, QueueCounts,
    SyncQueueOperation,
};

/// Characters of a content ID shown in list views.
const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Format one library row for list output.
///
/// Pinned rows are marked with `*`.
pub fn format_item_line(item: &LibraryContentMetadata) -> String {
    let marker = if item.is_pinned { '*' } else { '-' };
    format!(
        "{} [{}] ({}, {}) {}: {}",
        marker,
        item.content_type,
        item.visibility,
        item.sync_status,
        short_id(&item.id),
        item.title
    )
}

/// Format item details and its body for the show command.
///
/// `publish_check` is the outcome of publish validation, `None` when it passed.
pub fn format_item_details(
    item: &LibraryContentMetadata,
    content: &Content,
    publish_check: Option<&str>,
) -> String {
    let mut output = Vec::new();

    output.push(format!("[{}] {}", item.content_type, item.id));
    output.push(format!("Title: {}", item.title));
    output.push(format!("Visibility: {}", item.visibility));
    output.push(format!("Sync: {}", item.sync_status));
    if let Some(public_id) = &item.public_id {
        output.push(format!("Public ID: {}", public_id));
    }
    if let Some(order) = item.pinned_order.filter(|_| item.is_pinned) {
        output.push(format!("Pinned: #{}", order + 1));
    }
    if !item.tags.is_empty() {
        output.push(format!("Tags: {}", item.tags.join(", ")));
    }
    output.push(format!("Language: {}", item.language));
    output.push(format!("Created: {}", format_timestamp(&item.created_at)));
    output.push(format!("Updated: {}", format_timestamp(&item.updated_at)));
    if let Some(published_at) = &item.published_at {
        output.push(format!("Published: {}", format_timestamp(published_at)));
    }
    if let Some(fork) = &item.fork {
        output.push(format!(
            "Forked from: {} by @{}",
            fork.original_content_public_id, fork.original_author_username
        ));
    }
    match publish_check {
        None => output.push("Publishable: yes".to_string()),
        Some(reason) => output.push(format!("Publishable: no ({})", reason)),
    }

    if !item.description.is_empty() {
        output.push(String::new());
        output.push("Description:".to_string());
        output.push(format!("    {}", item.description));
    }

    output.push(String::new());
    match content {
        Content::Checklist(checklist) => format_checklist(checklist, &mut output),
        Content::Guide(guide) => format_guide(guide, &mut output),
        Content::Deck(deck) => format_deck(deck, &mut output),
    }

    output.join("\n")
}

fn format_checklist(checklist: &Checklist, output: &mut Vec<String>) {
    output.push(format!(
        "Sections: {} ({} items)",
        checklist.sections.len(),
        checklist.item_count()
    ));
    for section in &checklist.sections {
        output.push(format!("  {}", section.title));
        for item in &section.items {
            let required = if item.is_required { " (required)" } else { "" };
            output.push(format!("    - [ ] {}{}", item.title, required));
            if let Some(notes) = item.notes.as_deref().filter(|n| !n.is_empty()) {
                output.push(format!("          {}", notes));
            }
        }
    }
}

fn format_guide(guide: &PracticeGuide, output: &mut Vec<String>) {
    output.push("Guide:".to_string());
    for line in guide.markdown.lines() {
        output.push(format!("    {}", line));
    }
}

fn format_deck(deck: &FlashcardDeck, output: &mut Vec<String>) {
    output.push(format!("Cards: {}", deck.cards.len()));
    for (n, card) in deck.cards.iter().enumerate() {
        output.push(format!("  {}. {}", n + 1, card.front));
        output.push(format!("     {}", card.back));
    }
}

pub fn format_queue_counts(counts: &QueueCounts) -> String {
    format!("Queue: {} pending, {} failed", counts.pending, counts.failed)
}

/// Format one queue row: `#id operation content -> visibility`, then attempts.
pub fn format_operation_line(op: &SyncQueueOperation, max_retries: u32) -> String {
    let mut line = format!(
        "#{} {} {} -> {} (attempts {}/{})",
        op.id,
        op.operation,
        short_id(&op.content_id),
        op.visibility,
        op.retry_count,
        max_retries
    );
    if let Some(err) = &op.last_error {
        line.push_str(&format!(": {}", err));
    }
    line
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
