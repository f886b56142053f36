//! Screen state for front ends driving the learning flow.
//!
//! Navigation, the flashcard deck, per-screen load state, and the speech
//! single-flight guard are plain values owned by the caller. Nothing here is
//! global or shared.

use serde::Serialize;

use crate::types::{StoryContent, VocabularyItem};

/// Shown when a flashcard set couldn't be generated.
pub const VOCABULARY_RETRY_MESSAGE: &str = "Không tải được thẻ. Bé thử lại nhé!";
/// Shown when a story couldn't be generated.
pub const STORY_RETRY_MESSAGE: &str = "Không thể tạo truyện. Thử lại nhé!";

// ─── Navigation ────────────────────────────────────────────────────────────

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    Menu,
    Flashcards,
    Story,
}

/// Navigation state passed between the controller and each screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub mode: AppMode,
    pub selected_topic: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            mode: AppMode::Menu,
            selected_topic: None,
        }
    }
}

impl Session {
    /// Switch screens. A topic, when given, replaces the selected one.
    pub fn navigate(&mut self, mode: AppMode, topic: Option<&str>) {
        if let Some(topic) = topic {
            self.selected_topic = Some(topic.to_string());
        }
        self.mode = mode;
    }

    /// Exit to the menu, keeping the last topic.
    pub fn back_to_menu(&mut self) {
        self.mode = AppMode::Menu;
    }
}

// ─── Loading ───────────────────────────────────────────────────────────────

/// Load state of a screen's generated content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    Loading,
    Loaded(T),
    /// Friendly retry prompt; the underlying error has already been logged.
    RetryPrompt(&'static str),
}

impl LoadState<FlashcardDeck> {
    /// Map a vocabulary result: an error or an empty list both become the
    /// retry prompt.
    pub fn from_vocabulary<E>(result: Result<Vec<VocabularyItem>, E>) -> Self {
        match result.ok().and_then(FlashcardDeck::new) {
            Some(deck) => Self::Loaded(deck),
            None => Self::RetryPrompt(VOCABULARY_RETRY_MESSAGE),
        }
    }
}

impl LoadState<StoryContent> {
    pub fn from_story<E>(result: Result<StoryContent, E>) -> Self {
        match result {
            Ok(story) => Self::Loaded(story),
            Err(_) => Self::RetryPrompt(STORY_RETRY_MESSAGE),
        }
    }
}

// ─── Flashcards ────────────────────────────────────────────────────────────

/// A non-empty set of flashcards with a cursor and a flipped flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardDeck {
    cards: Vec<VocabularyItem>,
    index: usize,
    flipped: bool,
}

impl FlashcardDeck {
    /// Returns `None` for an empty set; there is nothing to show.
    pub fn new(cards: Vec<VocabularyItem>) -> Option<Self> {
        if cards.is_empty() {
            return None;
        }
        Some(Self {
            cards,
            index: 0,
            flipped: false,
        })
    }

    pub fn current(&self) -> &VocabularyItem {
        &self.cards[self.index]
    }

    /// 1-based position and total, e.g. `(1, 5)`.
    pub fn position(&self) -> (usize, usize) {
        (self.index + 1, self.cards.len())
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Advance; wraps to the first card after the last.
    pub fn next(&mut self) {
        self.flipped = false;
        self.index = (self.index + 1) % self.cards.len();
    }

    /// Go back; stays on the first card.
    pub fn prev(&mut self) {
        self.flipped = false;
        self.index = self.index.saturating_sub(1);
    }

    pub fn cards(&self) -> &[VocabularyItem] {
        &self.cards
    }
}

// ─── Speech guard ──────────────────────────────────────────────────────────

/// Speech state of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechState {
    Idle,
    Requesting,
    Playing,
}

/// Rejected because a speech request is already in flight or playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechBusy(pub SpeechState);

impl std::fmt::Display for SpeechBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "speech busy ({:?})", self.0)
    }
}

impl std::error::Error for SpeechBusy {}

/// Single-flight guard: idle → requesting → playing → idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechGuard {
    state: SpeechState,
}

impl Default for SpeechGuard {
    fn default() -> Self {
        Self {
            state: SpeechState::Idle,
        }
    }
}

impl SpeechGuard {
    pub fn state(&self) -> SpeechState {
        self.state
    }

    /// Start a speech request. Rejected unless idle.
    pub fn begin(&mut self) -> Result<(), SpeechBusy> {
        if self.state != SpeechState::Idle {
            return Err(SpeechBusy(self.state));
        }
        self.state = SpeechState::Requesting;
        Ok(())
    }

    /// The request resolved. With audio the guard moves to playing;
    /// without, straight back to idle.
    pub fn resolved(&mut self, has_audio: bool) {
        if self.state == SpeechState::Requesting {
            self.state = if has_audio {
                SpeechState::Playing
            } else {
                SpeechState::Idle
            };
        }
    }

    /// Playback ended.
    pub fn finished(&mut self) {
        if self.state == SpeechState::Playing {
            self.state = SpeechState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(word: &str) -> VocabularyItem {
        VocabularyItem {
            word: word.into(),
            vietnamese: format!("{word} (vi)"),
            emoji: "⭐".into(),
            sentence: format!("I see a {word}."),
        }
    }

    fn deck(n: usize) -> FlashcardDeck {
        FlashcardDeck::new((0..n).map(|i| card(&format!("w{i}"))).collect()).unwrap()
    }

    #[test]
    fn navigate_sets_topic_and_mode() {
        let mut session = Session::default();
        session.navigate(AppMode::Flashcards, Some("Trái cây (Fruits)"));
        assert_eq!(session.mode, AppMode::Flashcards);
        assert_eq!(session.selected_topic.as_deref(), Some("Trái cây (Fruits)"));

        session.back_to_menu();
        assert_eq!(session.mode, AppMode::Menu);
        session.navigate(AppMode::Story, None);
        assert_eq!(session.selected_topic.as_deref(), Some("Trái cây (Fruits)"));
    }

    #[test]
    fn empty_deck_is_none() {
        assert!(FlashcardDeck::new(Vec::new()).is_none());
    }

    #[test]
    fn deck_starts_at_card_one() {
        let d = deck(5);
        assert_eq!(d.position(), (1, 5));
        assert_eq!(d.current().word, "w0");
        assert!(!d.is_flipped());
    }

    #[test]
    fn next_wraps_around() {
        let mut d = deck(5);
        for _ in 0..4 {
            d.next();
        }
        assert_eq!(d.position(), (5, 5));
        d.next();
        assert_eq!(d.position(), (1, 5));
    }

    #[test]
    fn prev_stays_at_first() {
        let mut d = deck(3);
        d.prev();
        assert_eq!(d.position(), (1, 3));
        d.next();
        d.prev();
        assert_eq!(d.current().word, "w0");
    }

    #[test]
    fn moving_resets_flip() {
        let mut d = deck(2);
        d.flip();
        assert!(d.is_flipped());
        d.next();
        assert!(!d.is_flipped());
        d.flip();
        d.prev();
        assert!(!d.is_flipped());
    }

    #[test]
    fn vocabulary_load_state() {
        let ok: Result<_, ()> = Ok(vec![card("cat")]);
        assert!(matches!(LoadState::from_vocabulary(ok), LoadState::Loaded(_)));

        let empty: Result<Vec<VocabularyItem>, ()> = Ok(Vec::new());
        assert_eq!(
            LoadState::from_vocabulary(empty),
            LoadState::RetryPrompt(VOCABULARY_RETRY_MESSAGE)
        );

        let failed: Result<Vec<VocabularyItem>, &str> = Err("connection reset");
        assert_eq!(
            LoadState::from_vocabulary(failed),
            LoadState::RetryPrompt(VOCABULARY_RETRY_MESSAGE)
        );
    }

    #[test]
    fn story_failure_is_retry_prompt() {
        let failed: Result<StoryContent, &str> = Err("no content generated");
        assert_eq!(
            LoadState::from_story(failed),
            LoadState::RetryPrompt(STORY_RETRY_MESSAGE)
        );
    }

    #[test]
    fn speech_guard_full_cycle() {
        let mut guard = SpeechGuard::default();
        assert_eq!(guard.state(), SpeechState::Idle);
        guard.begin().unwrap();
        assert_eq!(guard.state(), SpeechState::Requesting);
        guard.resolved(true);
        assert_eq!(guard.state(), SpeechState::Playing);
        guard.finished();
        assert_eq!(guard.state(), SpeechState::Idle);
    }

    #[test]
    fn speech_guard_rejects_overlap() {
        let mut guard = SpeechGuard::default();
        guard.begin().unwrap();
        assert_eq!(guard.begin(), Err(SpeechBusy(SpeechState::Requesting)));
        guard.resolved(true);
        assert_eq!(guard.begin(), Err(SpeechBusy(SpeechState::Playing)));
    }

    #[test]
    fn absent_audio_returns_to_idle() {
        let mut guard = SpeechGuard::default();
        guard.begin().unwrap();
        guard.resolved(false);
        assert_eq!(guard.state(), SpeechState::Idle);
        assert!(guard.begin().is_ok());
    }

    #[test]
    fn stray_transitions_are_ignored() {
        let mut guard = SpeechGuard::default();
        guard.finished();
        guard.resolved(true);
        assert_eq!(guard.state(), SpeechState::Idle);
    }
}
