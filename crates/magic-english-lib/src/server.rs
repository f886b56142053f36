//! HTTP API for the Magic English front end.
//!
//! Runs on port 2004 by default. CORS-permissive so a browser front end on
//! another localhost port can call it. Failures never reach the child as raw
//! error text: content routes answer `ok: false` with a friendly retry
//! message, and speech answers `204 No Content`.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use magic_english_core::session::{LoadState, STORY_RETRY_MESSAGE, VOCABULARY_RETRY_MESSAGE};
use magic_english_core::types::{STORY_THEMES, StoryContent, TOPICS, Topic, VocabularyItem};
use magic_english_core::wav::write_wav;

use crate::content::ContentClient;
use crate::gemini::GenerativeBackend;
use crate::speech::SpeechClient;

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState<B> {
    pub content: ContentClient<B>,
    pub speech: SpeechClient<B>,
}

/// Build the axum router over the given clients.
pub fn router<B>(state: ApiState<B>) -> Router
where
    B: GenerativeBackend + Clone + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/topics", get(topics))
        .route("/vocabulary", post(vocabulary::<B>))
        .route("/story", post(story::<B>))
        .route("/speech", post(speech::<B>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct TopicRequest {
    topic: String,
}

#[derive(serde::Deserialize)]
struct SpeechRequest {
    text: String,
}

#[derive(serde::Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(serde::Serialize)]
struct TopicsResponse {
    topics: &'static [Topic],
    story_themes: &'static [&'static str],
}

#[derive(serde::Serialize)]
struct VocabularyResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    items: Vec<VocabularyItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(serde::Serialize)]
struct StoryResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    story: Option<StoryContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl VocabularyResponse {
    fn retry(message: &'static str) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            message: Some(message),
        }
    }
}

impl StoryResponse {
    fn retry(message: &'static str) -> Self {
        Self {
            ok: false,
            story: None,
            message: Some(message),
        }
    }
}

async fn health() -> Json<OkResponse> {
    Json(OkResponse { ok: true })
}

async fn topics() -> Json<TopicsResponse> {
    Json(TopicsResponse {
        topics: TOPICS,
        story_themes: STORY_THEMES,
    })
}

async fn vocabulary<B: GenerativeBackend + Clone + 'static>(
    State(state): State<ApiState<B>>,
    Json(req): Json<TopicRequest>,
) -> Json<VocabularyResponse> {
    let result = state
        .content
        .generate_vocabulary(&req.topic)
        .await
        .inspect_err(|e| error!("vocabulary {:?}: {e}", req.topic));

    Json(match LoadState::from_vocabulary(result) {
        LoadState::Loaded(deck) => VocabularyResponse {
            ok: true,
            items: deck.cards().to_vec(),
            message: None,
        },
        LoadState::RetryPrompt(message) => VocabularyResponse::retry(message),
        LoadState::Loading => VocabularyResponse::retry(VOCABULARY_RETRY_MESSAGE),
    })
}

async fn story<B: GenerativeBackend + Clone + 'static>(
    State(state): State<ApiState<B>>,
    Json(req): Json<TopicRequest>,
) -> Json<StoryResponse> {
    let result = state
        .content
        .generate_story(&req.topic)
        .await
        .inspect_err(|e| error!("story {:?}: {e}", req.topic));

    Json(match LoadState::from_story(result) {
        LoadState::Loaded(story) => StoryResponse {
            ok: true,
            story: Some(story),
            message: None,
        },
        LoadState::RetryPrompt(message) => StoryResponse::retry(message),
        LoadState::Loading => StoryResponse::retry(STORY_RETRY_MESSAGE),
    })
}

async fn speech<B: GenerativeBackend + Clone + 'static>(
    State(state): State<ApiState<B>>,
    Json(req): Json<SpeechRequest>,
) -> Response {
    let Some(audio) = state.speech.speak(&req.text).await else {
        return StatusCode::NO_CONTENT.into_response();
    };
    match write_wav(&audio) {
        Ok(wav) => ([(header::CONTENT_TYPE, "audio/wav")], wav).into_response(),
        Err(e) => {
            warn!("speech: {e}");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}
