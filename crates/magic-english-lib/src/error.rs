//! Error types for the Magic English engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the generative backend or playing audio.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the backend
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The model returned no text
    #[error("no content generated")]
    EmptyGeneration,

    /// Generated text wasn't valid JSON for the declared schema
    #[error("invalid generated JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Generated JSON parsed but a required field was blank
    #[error("malformed generation: {0}")]
    Malformed(&'static str),

    /// Speech payload couldn't be decoded
    #[error("audio decode error: {0}")]
    Decode(String),

    /// Output device error
    #[error("audio error: {0}")]
    Audio(String),
}
