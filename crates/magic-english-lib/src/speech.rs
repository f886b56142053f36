//! Speech synthesis — text → TTS request → base64 payload → [`DecodedAudio`].
//!
//! Speech is a supplementary affordance: every failure (transport, API
//! status, missing payload, base64, audio format) ends in `None` through
//! [`audio_or_absent`] and is only logged.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};

use magic_english_core::text_prep::{clean_text_for_speech, is_speakable};
use magic_english_core::wav::{DecodedAudio, decode_audio};

use crate::error::{Error, Result};
use crate::gemini::{GenerateContentRequest, GenerativeBackend};

/// Converts text into locally playable audio.
#[derive(Clone)]
pub struct SpeechClient<B> {
    backend: B,
    model: String,
    voice: String,
}

impl<B: GenerativeBackend> SpeechClient<B> {
    pub fn new(backend: B, model: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            voice: voice.into(),
        }
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Synthesize `text`. `None` means "no audio available"; skip playback.
    pub async fn speak(&self, text: &str) -> Option<DecodedAudio> {
        audio_or_absent(self.synthesize(text).await)
    }

    async fn synthesize(&self, text: &str) -> Result<Option<DecodedAudio>> {
        let text = clean_text_for_speech(text);
        if !is_speakable(&text) {
            debug!("speech: nothing to say");
            return Ok(None);
        }

        debug!("speech: {} chars with voice {}", text.len(), self.voice);
        let request = GenerateContentRequest::speech(text, &self.voice);
        let response = self.backend.generate_content(&self.model, &request).await?;

        let Some(inline) = response.inline_data() else {
            debug!("speech: response carried no audio");
            return Ok(None);
        };
        let encoded = inline.data.as_deref().unwrap_or_default();
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| Error::Decode(e.to_string()))?;
        let audio = decode_audio(&bytes, inline.mime_type.as_deref())
            .map_err(|e| Error::Decode(e.to_string()))?;

        debug!(
            "speech: decoded {:?} at {} Hz",
            audio.duration(),
            audio.sample_rate
        );
        Ok(Some(audio))
    }
}

/// The speech failure policy: every error kind becomes "absent".
pub fn audio_or_absent(result: Result<Option<DecodedAudio>>) -> Option<DecodedAudio> {
    match result {
        Ok(audio) => audio,
        Err(e) => {
            warn!("speech: {e}");
            None
        }
    }
}
