//! One-shot playback of decoded audio through the default output device.
//!
//! Every call opens its own output stream on its own OS thread (rodio
//! `OutputStream` is `!Send`) and returns immediately. There's no queue and no
//! handle: two calls play at the same time.

use std::thread::JoinHandle;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};
use tracing::{debug, error};

use magic_english_core::wav::DecodedAudio;

use crate::error::{Error, Result};

/// Something that starts playing decoded audio without waiting for it.
pub trait Playback {
    fn play(&self, audio: &DecodedAudio);
}

/// Fire-and-forget audio player.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioPlayer;

impl Playback for AudioPlayer {
    /// Start playing `audio` now. Device errors are logged, not returned.
    fn play(&self, audio: &DecodedAudio) {
        if let Err(e) = self.spawn_playback(audio) {
            error!("playback: {e}");
        }
    }
}

impl AudioPlayer {
    pub fn new() -> Self {
        Self
    }

    fn spawn_playback(&self, audio: &DecodedAudio) -> Result<JoinHandle<()>> {
        let source = SamplesBuffer::new(audio.channels, audio.sample_rate, audio.samples.clone());
        let duration = audio.duration();

        std::thread::Builder::new()
            .name("magic-english-playback".into())
            .spawn(move || {
                if let Err(e) = play_blocking(source) {
                    error!("playback: {e}");
                    return;
                }
                debug!("playback: finished {duration:?}");
            })
            .map_err(|e| Error::Audio(format!("failed to spawn playback thread: {e}")))
    }
}

fn play_blocking(source: SamplesBuffer<i16>) -> Result<()> {
    let (_stream, stream_handle) = OutputStream::try_default()
        .map_err(|e| Error::Audio(format!("failed to open audio output: {e}")))?;
    let sink = Sink::try_new(&stream_handle)
        .map_err(|e| Error::Audio(format!("failed to create sink: {e}")))?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}
