use std::path::Path;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::SynthesisConfig;

pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

/// Pre-made voices addressable by name instead of raw id.
const PREMADE_VOICES: &[(&str, &str)] = &[
    ("rachel", "21m00Tcm4TlvDq8ikWAM"),
    ("drew", "29vD33N1CtxCmqQRPOHJ"),
    ("clyde", "2EiwWnXFnvU5JabPnv8n"),
    ("paul", "5Q0t7uMcjvnagumLfvZi"),
    ("domi", "AZnzlk1XvdvUeBnXmlld"),
    ("bella", "EXAVITQu4vr4xnSDxMaL"),
    ("antoni", "ErXwobaYiN019PkySvjV"),
    ("josh", "TxGEqnHWrfWFTfGW9XjX"),
    ("arnold", "VR6AewLTigWG4xSOukaG"),
    ("adam", "pNInz6obpgDQGcFmaJgB"),
    ("sam", "yoZ06aMxZJJ28mfd3POQ"),
];

/// Map a voice name to its id; anything not in the table is assumed to
/// already be an id and passed through.
pub fn resolve_voice(voice: &str) -> &str {
    let lower = voice.to_ascii_lowercase();
    PREMADE_VOICES
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, id)| *id)
        .unwrap_or(voice)
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("authentication rejected by synthesis API")]
    Auth,
    #[error("synthesis character quota exceeded")]
    QuotaExceeded,
    #[error("synthesis API returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("synthesis request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),
}

pub struct SpeechClient {
    client: Client,
    api_url: String,
    api_key: String,
    voice_id: String,
    model_id: String,
}

impl SpeechClient {
    /// Build a client from config and the `ELEVENLABS_API_KEY` environment
    /// variable. Returns `None` when no key is set; the surrounding cycle
    /// then publishes articles without a podcast.
    pub fn from_config(config: &SynthesisConfig) -> Option<Self> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.is_empty() => Some(Self::new(config, key)),
            _ => {
                warn!("{} not set, podcast synthesis disabled", API_KEY_ENV);
                None
            }
        }
    }

    pub fn new(config: &SynthesisConfig, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key,
            voice_id: resolve_voice(&config.voice).to_string(),
            model_id: config.model_id.clone(),
        }
    }

    /// Synthesize `text` and return the audio bytes. No retries: auth,
    /// quota, and network failures are reported to the caller, which
    /// degrades the cycle to articles-only.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let url = format!("{}/text-to-speech/{}", self.api_url, self.voice_id);

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&json!({
                "text": text,
                "model_id": self.model_id,
                "voice_settings": {
                    "stability": 0.6,
                    "similarity_boost": 0.8,
                    "style": 0.4,
                    "use_speaker_boost": true,
                },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SynthesisError::Auth,
                StatusCode::TOO_MANY_REQUESTS => SynthesisError::QuotaExceeded,
                _ => SynthesisError::Api { status, body },
            });
        }

        let audio = response.bytes().await?.to_vec();
        info!("Received {} bytes of audio", audio.len());
        Ok(audio)
    }

    /// Synthesize `text` and write the audio to `path`.
    pub async fn synthesize_to_file(&self, text: &str, path: &Path) -> Result<(), SynthesisError> {
        let audio = self.synthesize(text).await?;
        save_artifact(&audio, path).await?;
        Ok(())
    }
}

/// Write audio to a sibling temp file, then rename it into place, so a
/// concurrent download never sees a half-written artifact.
pub async fn save_artifact(audio: &[u8], path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, audio).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
