//! Generative backend client — `models/{model}:generateContent` over HTTP.
//!
//! [`GenerativeBackend`] is the seam the content and speech clients are
//! generic over; [`GeminiClient`] is the reqwest implementation.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use magic_english_core::schema::Schema;
use magic_english_core::types::GenAiConfig;

use crate::error::{Error, Result};

// ─── Wire types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Prompt whose answer must be JSON matching `schema`.
    pub fn structured(prompt: String, schema: Schema) -> Self {
        Self {
            contents: vec![Content::text(prompt)],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".into()),
                response_schema: Some(schema),
                ..Default::default()
            }),
        }
    }

    /// Text-to-speech request with a prebuilt voice.
    pub fn speech(text: String, voice: &str) -> Self {
        Self {
            contents: vec![Content::text(text)],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec![Modality::Audio]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.to_string(),
                        },
                    },
                }),
                ..Default::default()
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(text: String) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text),
                ..Default::default()
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    /// Set on reasoning parts, which aren't part of the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Base64-encoded payload.
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<Modality>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Text,
    Audio,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated answer text of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }

    /// `candidates[0].content.parts[0].inlineData`, when it carries data.
    pub fn inline_data(&self) -> Option<&InlineData> {
        let part = self.candidates.first()?.content.as_ref()?.parts.first()?;
        part.inline_data
            .as_ref()
            .filter(|d| d.data.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

// ─── Backend trait ─────────────────────────────────────────────────────────

/// Something that answers `generateContent` calls.
pub trait GenerativeBackend: Send + Sync {
    fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> impl Future<Output = Result<GenerateContentResponse>> + Send;
}

// ─── HTTP client ───────────────────────────────────────────────────────────

/// Cloneable HTTP client for the Gemini API.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &GenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config("API key required for the generative backend".into()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

impl GenerativeBackend for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        debug!("generate: POST {model}");

        let resp = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = api_error_message(&body);
            error!("generate: {model} returned {status}: {message}");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}

/// Pull `error.message` out of an API error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: ErrorBody,
    }
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<Envelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use magic_english_core::schema::vocabulary_schema;
    use serde_json::{Value, json};

    #[test]
    fn structured_request_wire_shape() {
        let req = GenerateContentRequest::structured("hi".into(), vocabulary_schema());
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!(value["generationConfig"].get("speechConfig").is_none());
    }

    #[test]
    fn speech_request_wire_shape() {
        let req = GenerateContentRequest::speech("Hello".into(), "Puck");
        let value = serde_json::to_value(&req).unwrap();
        let config = &value["generationConfig"];
        assert_eq!(config["responseModalities"], json!(["AUDIO"]));
        assert_eq!(
            config["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Puck"
        );
        assert!(config.get("responseSchema").is_none());
    }

    #[test]
    fn text_joins_parts_and_skips_thoughts() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "role": "model", "parts": [
                { "text": "thinking...", "thought": true },
                { "text": "[{\"word\":" },
                { "text": "\"cat\"}]" }
            ]}}]
        }))
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("[{\"word\":\"cat\"}]"));
    }

    #[test]
    fn text_absent_without_candidates() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(resp.text(), None);

        let resp: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{ "content": { "parts": [{ "text": "" }] } }] }))
                .unwrap();
        assert_eq!(resp.text(), None);
    }

    #[test]
    fn inline_data_from_first_part() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAA=" } }
            ]}}]
        }))
        .unwrap();
        let data = resp.inline_data().unwrap();
        assert_eq!(data.data.as_deref(), Some("AAA="));
        assert_eq!(data.mime_type.as_deref(), Some("audio/L16;codec=pcm;rate=24000"));
    }

    #[test]
    fn inline_data_missing_payload() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "mimeType": "audio/pcm" } }] } }]
        }))
        .unwrap();
        assert!(resp.inline_data().is_none());
    }

    #[test]
    fn api_error_message_prefers_envelope() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "API key not valid");
        assert_eq!(api_error_message(" bad gateway \n"), "bad gateway");
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let result = GeminiClient::new(&GenAiConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    async fn stub_generate(
        Path(call): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": { "message": "API key not valid" } })),
            );
        }
        let prompt = body["contents"][0]["parts"][0]["text"].clone();
        (
            StatusCode::OK,
            Json(json!({
                "candidates": [{ "content": { "parts": [{ "text": format!("{call}|{}", prompt.as_str().unwrap_or("")) }] } }]
            })),
        )
    }

    async fn spawn_stub() -> String {
        let app = Router::new().route("/v1beta/models/{call}", post(stub_generate));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn config(base_url: String, api_key: &str) -> GenAiConfig {
        GenAiConfig {
            api_key: api_key.into(),
            base_url,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn posts_to_model_endpoint_with_key() {
        let base = spawn_stub().await;
        let client = GeminiClient::new(&config(base, "test-key")).unwrap();
        let req = GenerateContentRequest::structured("hello".into(), vocabulary_schema());

        let resp = client.generate_content("test-model", &req).await.unwrap();
        assert_eq!(resp.text().as_deref(), Some("test-model:generateContent|hello"));
    }

    #[tokio::test]
    async fn non_success_maps_to_api_error() {
        let base = spawn_stub().await;
        let client = GeminiClient::new(&config(base, "wrong-key")).unwrap();
        let req = GenerateContentRequest::speech("hi".into(), "Puck");

        match client.generate_content("test-model", &req).await {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_backend_is_http_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GeminiClient::new(&config(format!("http://{addr}"), "test-key")).unwrap();
        let req = GenerateContentRequest::speech("hi".into(), "Puck");
        let result = client.generate_content("test-model", &req).await;
        assert!(matches!(result, Err(Error::Http(_))));
    }
}
