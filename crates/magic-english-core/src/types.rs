//! Shared types for the Magic English app.
//!
//! These types are used across magic-english-lib, magic-english-cli, and any
//! front end talking to the HTTP API. Keeping them in the core crate means
//! consumers can depend on them without pulling in tokio, rodio, or reqwest.

use serde::{Deserialize, Serialize};

/// Number of flashcards requested per vocabulary generation.
pub const VOCABULARY_SIZE: usize = 5;

// ─── Generated content ─────────────────────────────────────────────────────

/// One flashcard: an English word with its Vietnamese meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub word: String,
    pub vietnamese: String,
    pub emoji: String,
    pub sentence: String,
}

impl VocabularyItem {
    /// True when every field carries non-blank text.
    pub fn is_well_formed(&self) -> bool {
        [&self.word, &self.vietnamese, &self.emoji, &self.sentence]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// A short illustrated story with a Vietnamese summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryContent {
    pub title: String,
    pub content: String,
    pub vietnamese_summary: String,
}

impl StoryContent {
    /// True when every field carries non-blank text.
    pub fn is_well_formed(&self) -> bool {
        [&self.title, &self.content, &self.vietnamese_summary]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

// ─── Topic catalog ─────────────────────────────────────────────────────────

/// A fixed learning subject offered on the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub id: &'static str,
    /// Bilingual label; also the topic string sent to the model.
    pub label: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
}

pub const TOPICS: &[Topic] = &[
    Topic {
        id: "animals",
        label: "Động vật (Animals)",
        emoji: "🦁",
        color: "orange",
    },
    Topic {
        id: "fruits",
        label: "Trái cây (Fruits)",
        emoji: "🍎",
        color: "red",
    },
    Topic {
        id: "colors",
        label: "Màu sắc (Colors)",
        emoji: "🎨",
        color: "purple",
    },
    Topic {
        id: "family",
        label: "Gia đình (Family)",
        emoji: "👨‍👩‍👧‍👦",
        color: "blue",
    },
    Topic {
        id: "body",
        label: "Cơ thể (Body)",
        emoji: "👀",
        color: "pink",
    },
    Topic {
        id: "numbers",
        label: "Số đếm (Numbers)",
        emoji: "1️⃣",
        color: "green",
    },
];

/// Story themes offered below the topic grid.
pub const STORY_THEMES: &[&str] = &["Friendly Animals", "Space Adventure"];

/// Look up a topic by id (case-insensitive).
pub fn find_topic(id: &str) -> Option<&'static Topic> {
    TOPICS.iter().find(|t| t.id.eq_ignore_ascii_case(id))
}

// ─── Backend configuration ─────────────────────────────────────────────────

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_VOICE: &str = "Puck";

/// Generative backend configuration.
#[derive(Debug, Clone)]
pub struct GenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub speech_model: String,
    pub voice: String,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.into(),
            text_model: DEFAULT_TEXT_MODEL.into(),
            speech_model: DEFAULT_SPEECH_MODEL.into(),
            voice: DEFAULT_VOICE.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat() -> VocabularyItem {
        VocabularyItem {
            word: "cat".into(),
            vietnamese: "con mèo".into(),
            emoji: "🐱".into(),
            sentence: "The cat is cute.".into(),
        }
    }

    #[test]
    fn well_formed_item() {
        assert!(cat().is_well_formed());
    }

    #[test]
    fn blank_field_is_not_well_formed() {
        let mut item = cat();
        item.emoji = "  ".into();
        assert!(!item.is_well_formed());
    }

    #[test]
    fn story_requires_summary() {
        let story = StoryContent {
            title: "Tom the Cat".into(),
            content: "Tom likes milk.".into(),
            vietnamese_summary: String::new(),
        };
        assert!(!story.is_well_formed());
    }

    #[test]
    fn topic_catalog_ids_are_unique() {
        let mut ids: Vec<_> = TOPICS.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), TOPICS.len());
    }

    #[test]
    fn find_topic_by_id() {
        assert_eq!(find_topic("Fruits").map(|t| t.label), Some("Trái cây (Fruits)"));
        assert!(find_topic("dinosaurs").is_none());
    }

    #[test]
    fn vocabulary_item_field_names() {
        let json = serde_json::to_value(cat()).unwrap();
        assert_eq!(json["vietnamese"], "con mèo");
        assert_eq!(json["sentence"], "The cat is cute.");
    }

    #[test]
    fn default_config_uses_friendly_voice() {
        let config = GenAiConfig::default();
        assert_eq!(config.voice, "Puck");
        assert_eq!(config.text_model, "gemini-2.5-flash");
        assert!(config.api_key.is_empty());
    }
}
