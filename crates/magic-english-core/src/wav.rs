//! Speech payload decoding and WAV encoding.
//!
//! Pure functions: no I/O and no async runtime.

use std::time::Duration;

/// Sample rate the speech model uses when the MIME type doesn't say.
pub const DEFAULT_SPEECH_SAMPLE_RATE: u32 = 24_000;
/// Highest sample rate accepted from a payload.
pub const MAX_SAMPLE_RATE: u32 = 384_000;
/// Highest channel count accepted from a payload.
pub const MAX_CHANNELS: u16 = 8;

/// In-memory, ready-to-play 16-bit PCM audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    /// Interleaved samples.
    pub samples: Vec<i16>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Playback length of the buffer.
    pub fn duration(&self) -> Duration {
        if self.channels == 0 || self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        Duration::from_micros(frames * 1_000_000 / self.sample_rate as u64)
    }
}

/// Decode a speech payload into playable audio.
///
/// Accepts a RIFF/WAV container (16-bit PCM) or headerless little-endian
/// 16-bit PCM when `mime_type` says so (`audio/L16;codec=pcm;rate=24000`,
/// `audio/pcm`).
pub fn decode_audio(bytes: &[u8], mime_type: Option<&str>) -> Result<DecodedAudio, &'static str> {
    let audio = if bytes.starts_with(b"RIFF") {
        let hdr = parse_wav_header(bytes)?;
        if hdr.bits_per_sample != 16 {
            return Err("unsupported bit depth");
        }
        DecodedAudio {
            samples: pcm_from_le_bytes(&bytes[hdr.data_offset..]),
            channels: hdr.channels,
            sample_rate: hdr.sample_rate,
        }
    } else {
        let format = mime_type.and_then(parse_pcm_mime).ok_or("unsupported audio format")?;
        DecodedAudio {
            samples: pcm_from_le_bytes(bytes),
            channels: format.channels,
            sample_rate: format.sample_rate,
        }
    };

    if !(1..=MAX_CHANNELS).contains(&audio.channels)
        || !(1..=MAX_SAMPLE_RATE).contains(&audio.sample_rate)
    {
        return Err("invalid audio format");
    }
    if audio.samples.is_empty() {
        return Err("no audio samples");
    }
    Ok(audio)
}

/// Format parameters carried by a raw PCM MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Parse `audio/L16;codec=pcm;rate=24000` style MIME types.
///
/// Returns `None` for anything that isn't raw 16-bit PCM.
pub fn parse_pcm_mime(mime: &str) -> Option<PcmFormat> {
    let mut params = mime.split(';').map(str::trim);
    let essence = params.next()?.to_ascii_lowercase();
    if essence != "audio/l16" && essence != "audio/pcm" {
        return None;
    }

    let mut format = PcmFormat {
        sample_rate: DEFAULT_SPEECH_SAMPLE_RATE,
        channels: 1,
    };
    for param in params {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "rate" => format.sample_rate = value.trim().parse().ok()?,
            "channels" => format.channels = value.trim().parse().ok()?,
            _ => {}
        }
    }
    Some(format)
}

/// Convert little-endian bytes to i16 samples. A trailing odd byte is dropped.
pub fn pcm_from_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Encode decoded audio as a 16-bit PCM WAV file.
///
/// Fails when the format or length doesn't fit the WAV header fields.
pub fn write_wav(audio: &DecodedAudio) -> Result<Vec<u8>, &'static str> {
    const TOO_LARGE: &str = "audio too large for WAV";
    let data_len = audio
        .samples
        .len()
        .checked_mul(2)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(TOO_LARGE)?;
    let file_len = data_len.checked_add(36).ok_or(TOO_LARGE)?;
    let block_align = audio.channels.checked_mul(2).ok_or("invalid audio format")?;
    let byte_rate = audio
        .sample_rate
        .checked_mul(u32::from(block_align))
        .ok_or("invalid audio format")?;
    let mut buf = Vec::with_capacity(44 + data_len as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_len.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&audio.channels.to_le_bytes());
    buf.extend_from_slice(&audio.sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    for &sample in &audio.samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    Ok(buf)
}

/// WAV header fields needed to locate the PCM data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Byte offset in the buffer where raw PCM data begins.
    pub data_offset: usize,
}

/// Parse a WAV header from a byte buffer.
///
/// Tolerates `0xFFFFFFFF` sentinel chunk sizes written by streaming encoders.
pub fn parse_wav_header(buf: &[u8]) -> Result<WavHeader, &'static str> {
    if buf.len() < 12 {
        return Err("too short for RIFF header");
    }
    if &buf[0..4] != b"RIFF" {
        return Err("missing RIFF tag");
    }
    if &buf[8..12] != b"WAVE" {
        return Err("missing WAVE tag");
    }

    let mut pos = 12;
    let mut format: Option<(u16, u32, u16)> = None;

    while pos + 8 <= buf.len() {
        let chunk_id = &buf[pos..pos + 4];
        let chunk_size =
            u32::from_le_bytes([buf[pos + 4], buf[pos + 5], buf[pos + 6], buf[pos + 7]]);

        match chunk_id {
            b"fmt " => {
                if pos + 24 > buf.len() {
                    return Err("fmt chunk truncated");
                }
                if u16::from_le_bytes([buf[pos + 8], buf[pos + 9]]) != 1 {
                    return Err("not PCM format");
                }
                let channels = u16::from_le_bytes([buf[pos + 10], buf[pos + 11]]);
                let sample_rate = u32::from_le_bytes([
                    buf[pos + 12],
                    buf[pos + 13],
                    buf[pos + 14],
                    buf[pos + 15],
                ]);
                let bits = u16::from_le_bytes([buf[pos + 22], buf[pos + 23]]);
                format = Some((channels, sample_rate, bits));

                let skip = if chunk_size == 0xFFFFFFFF {
                    16
                } else {
                    chunk_size as usize
                };
                pos += 8 + skip;
            }
            b"data" => {
                let (channels, sample_rate, bits_per_sample) =
                    format.ok_or("data chunk before fmt chunk")?;
                return Ok(WavHeader {
                    channels,
                    sample_rate,
                    bits_per_sample,
                    data_offset: pos + 8,
                });
            }
            _ => {
                let skip = if chunk_size == 0xFFFFFFFF {
                    0
                } else {
                    chunk_size as usize
                };
                pos += 8 + skip;
            }
        }
    }

    Err("data chunk not found")
}
