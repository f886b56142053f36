//! magic-english-core — Pure types, prompts, schemas, and audio decoding.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod prompt;
pub mod schema;
pub mod session;
pub mod text_prep;
pub mod types;
pub mod wav;
