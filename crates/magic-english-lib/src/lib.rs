//! magic-english-lib — Learning content engine.
//!
//! Schema-constrained content generation, speech synthesis, audio playback,
//! and the HTTP API. Depends on magic-english-core for pure types, prompts,
//! and audio decoding.

pub mod content;
pub mod error;
pub mod gemini;
pub mod player;
pub mod server;
pub mod speech;

pub use error::{Error, Result};

// Re-export magic-english-core for convenience
pub use magic_english_core;
