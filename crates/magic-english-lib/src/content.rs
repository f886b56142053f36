//! Content generation — flashcards and stories via schema-constrained output.
//!
//! The model is asked to emit exactly the declared JSON shape; this module's
//! only defensive duty is to check that promise before handing data onward.

use tracing::{debug, warn};

use magic_english_core::prompt::{story_prompt, vocabulary_prompt};
use magic_english_core::schema::{story_schema, vocabulary_schema};
use magic_english_core::types::{StoryContent, VOCABULARY_SIZE, VocabularyItem};

use crate::error::{Error, Result};
use crate::gemini::{GenerateContentRequest, GenerativeBackend};

/// Turns a topic into validated learning content.
#[derive(Clone)]
pub struct ContentClient<B> {
    backend: B,
    model: String,
}

impl<B: GenerativeBackend> ContentClient<B> {
    pub fn new(backend: B, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Generate a set of flashcards for `topic`.
    ///
    /// An empty or malformed generation yields an empty list ("nothing to
    /// show"). Only transport and API failures are errors. No retries.
    pub async fn generate_vocabulary(&self, topic: &str) -> Result<Vec<VocabularyItem>> {
        let request =
            GenerateContentRequest::structured(vocabulary_prompt(topic), vocabulary_schema());
        let response = self.backend.generate_content(&self.model, &request).await?;

        let Some(text) = response.text() else {
            warn!("vocabulary: empty generation for {topic:?}");
            return Ok(Vec::new());
        };
        let items = parse_vocabulary(&text);
        debug!("vocabulary: {} items for {topic:?}", items.len());
        Ok(items)
    }

    /// Generate a short story for `topic`.
    pub async fn generate_story(&self, topic: &str) -> Result<StoryContent> {
        let request = GenerateContentRequest::structured(story_prompt(topic), story_schema());
        let response = self.backend.generate_content(&self.model, &request).await?;

        let text = response.text().ok_or(Error::EmptyGeneration)?;
        let story = parse_story(&text)?;
        debug!("story: {:?} for {topic:?}", story.title);
        Ok(story)
    }
}

/// Parse a generated flashcard array.
///
/// All-or-nothing: returns exactly [`VOCABULARY_SIZE`] well-formed items in
/// response order, or nothing.
pub fn parse_vocabulary(text: &str) -> Vec<VocabularyItem> {
    let items: Vec<VocabularyItem> = match serde_json::from_str(text) {
        Ok(items) => items,
        Err(e) => {
            warn!("vocabulary: failed to parse generation: {e}");
            return Vec::new();
        }
    };

    if items.len() != VOCABULARY_SIZE {
        warn!(
            "vocabulary: expected {VOCABULARY_SIZE} items, got {}",
            items.len()
        );
        return Vec::new();
    }
    if !items.iter().all(VocabularyItem::is_well_formed) {
        warn!("vocabulary: generation has blank fields");
        return Vec::new();
    }
    items
}

/// Parse a generated story object.
pub fn parse_story(text: &str) -> Result<StoryContent> {
    let story: StoryContent = serde_json::from_str(text)?;
    if !story.is_well_formed() {
        return Err(Error::Malformed("story has blank fields"));
    }
    Ok(story)
}
