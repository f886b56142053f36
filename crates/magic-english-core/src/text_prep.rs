//! Text preparation for speech — markup stripping and read-aloud text.
//!
//! Pure functions, no I/O.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::StoryContent;

// Compiled regexes — allocated once, reused across calls.
static RE_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static RE_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*_]([^*_]+)[*_]").unwrap());
static RE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*#{1,6}\s*").unwrap());
static RE_MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Strip markdown emphasis and headings the model sometimes emits, and
/// collapse whitespace, so text reads naturally when spoken.
pub fn clean_text_for_speech(text: &str) -> String {
    let mut c = RE_BOLD.replace_all(text, "$1").into_owned();
    c = RE_ITALIC.replace_all(&c, "$1").into_owned();
    c = RE_HEADING.replace_all(&c, "").into_owned();
    c = RE_MULTI_SPACE.replace_all(&c, " ").into_owned();
    c.trim().to_string()
}

/// True when the text has something a voice could say.
pub fn is_speakable(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

/// Text read aloud for a story: its title, then its body.
pub fn story_read_aloud(story: &StoryContent) -> String {
    let title = story.title.trim().trim_end_matches(['.', '!', '?']);
    format!("{title}. {}", story.content.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bold_and_italic() {
        assert_eq!(clean_text_for_speech("The **big** _red_ ball"), "The big red ball");
    }

    #[test]
    fn strips_headings() {
        assert_eq!(clean_text_for_speech("## Tom the Cat\nTom is happy."), "Tom the Cat\nTom is happy.");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_text_for_speech("  an   apple \n\n a day "), "an apple a day");
    }

    #[test]
    fn plain_word_unchanged() {
        assert_eq!(clean_text_for_speech("banana"), "banana");
    }

    #[test]
    fn speakable_requires_alphanumeric() {
        assert!(is_speakable("I"));
        assert!(is_speakable("mèo"));
        assert!(!is_speakable(""));
        assert!(!is_speakable(" 🐱 ... "));
    }

    #[test]
    fn read_aloud_joins_title_and_content() {
        let story = StoryContent {
            title: "Luna Goes to the Moon!".into(),
            content: "Luna has a red rocket. ".into(),
            vietnamese_summary: "Luna bay lên mặt trăng.".into(),
        };
        assert_eq!(story_read_aloud(&story), "Luna Goes to the Moon. Luna has a red rocket.");
    }
}
