// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Full content bodies.
//!
//! [`Content`] is a tagged union over the three variants. Its identity always
//! equals the owning metadata row's id.

use serde::{Deserialize, Serialize};

use crate::metadata::ContentType;

/// A single checkable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_required: bool,
}

/// An ordered group of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSection {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<ChecklistSection>,
}

impl Checklist {
    /// Total number of items across all sections.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeGuide {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Markdown body.
    #[serde(default, alias = "body")]
    pub markdown: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    #[serde(default)]
    pub id: String,
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardDeck {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cards: Vec<Flashcard>,
}

/// A full content body of any supported kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Checklist(Checklist),
    Guide(PracticeGuide),
    Deck(FlashcardDeck),
}

impl Content {
    pub fn id(&self) -> &str {
        match self {
            Content::Checklist(c) => &c.id,
            Content::Guide(g) => &g.id,
            Content::Deck(d) => &d.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Content::Checklist(c) => &c.title,
            Content::Guide(g) => &g.title,
            Content::Deck(d) => &d.title,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Content::Checklist(c) => &c.description,
            Content::Guide(g) => &g.description,
            Content::Deck(d) => &d.description,
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Content::Checklist(_) => ContentType::Checklist,
            Content::Guide(_) => ContentType::Guide,
            Content::Deck(_) => ContentType::Deck,
        }
    }

    pub fn as_checklist(&self) -> Option<&Checklist> {
        match self {
            Content::Checklist(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_guide(&self) -> Option<&PracticeGuide> {
        match self {
            Content::Guide(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_deck(&self) -> Option<&FlashcardDeck> {
        match self {
            Content::Deck(d) => Some(d),
            _ => None,
        }
    }

    pub fn into_checklist(self) -> Option<Checklist> {
        match self {
            Content::Checklist(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_guide(self) -> Option<PracticeGuide> {
        match self {
            Content::Guide(g) => Some(g),
            _ => None,
        }
    }

    pub fn into_deck(self) -> Option<FlashcardDeck> {
        match self {
            Content::Deck(d) => Some(d),
            _ => None,
        }
    }

    /// Serializes the variant body alone, without the `type` tag.
    ///
    /// This is the shape stored in `library_content_body.data` and sent as
    /// `content_data` on the wire.
    pub fn body_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Content::Checklist(c) => serde_json::to_value(c),
            Content::Guide(g) => serde_json::to_value(g),
            Content::Deck(d) => serde_json::to_value(d),
        }
    }

    /// Decodes a variant body for the given content type.
    pub fn from_body_json(
        content_type: ContentType,
        body: serde_json::Value,
    ) -> serde_json::Result<Self> {
        Ok(match content_type {
            ContentType::Checklist => Content::Checklist(serde_json::from_value(body)?),
            ContentType::Guide => Content::Guide(serde_json::from_value(body)?),
            ContentType::Deck => Content::Deck(serde_json::from_value(body)?),
        })
    }

    pub fn set_header(&mut self, title: String, description: String) {
        match self {
            Content::Checklist(c) => {
                c.title = title;
                c.description = description;
            }
            Content::Guide(g) => {
                g.title = title;
                g.description = description;
            }
            Content::Deck(d) => {
                d.title = title;
                d.description = description;
            }
        }
    }

    /// Assigns a new top-level id and nested section/item/card ids per `mode`.
    pub fn assign_ids<F>(&mut self, id: String, mode: NestedIds, mut next_id: F)
    where
        F: FnMut() -> String,
    {
        let mut assign = |slot: &mut String| {
            if mode == NestedIds::Regenerate || slot.is_empty() {
                *slot = next_id();
            }
        };
        match self {
            Content::Checklist(c) => {
                c.id = id;
                for section in &mut c.sections {
                    assign(&mut section.id);
                    for item in &mut section.items {
                        assign(&mut item.id);
                    }
                }
            }
            Content::Guide(g) => g.id = id,
            Content::Deck(d) => {
                d.id = id;
                for card in &mut d.cards {
                    assign(&mut card.id);
                }
            }
        }
    }
}

/// How [`Content::assign_ids`] treats nested ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedIds {
    /// Replace every nested id, e.g. for a fork of someone else's content.
    Regenerate,
    /// Keep existing nested ids and fill only blank ones.
    FillBlank,
}

impl From<Checklist> for Content {
    fn from(c: Checklist) -> Self {
        Content::Checklist(c)
    }
}

impl From<PracticeGuide> for Content {
    fn from(g: PracticeGuide) -> Self {
        Content::Guide(g)
    }
}

impl From<FlashcardDeck> for Content {
    fn from(d: FlashcardDeck) -> Self {
        Content::Deck(d)
    }
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
