//! Prompt text for generation requests.

use crate::types::VOCABULARY_SIZE;

/// Prompt for a set of flashcards about `topic`.
pub fn vocabulary_prompt(topic: &str) -> String {
    format!(
        "Generate {VOCABULARY_SIZE} simple, distinct English vocabulary words suitable for a \
         5-year-old child about the topic: \"{topic}\".\n\
         For each word, provide:\n\
         1. The English word.\n\
         2. The Vietnamese translation.\n\
         3. A single matching Emoji.\n\
         4. A very simple English example sentence using the word."
    )
}

/// Prompt for a short story about `topic`.
pub fn story_prompt(topic: &str) -> String {
    format!(
        "Write a very short, cute, and simple story (approx 50 words) in English for a \
         5-year-old child about \"{topic}\".\n\
         Use simple grammar.\n\
         Also provide a Vietnamese summary.\n\
         Format as JSON."
    )
}
