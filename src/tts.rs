use std::{path::Path, time::Duration};

use anyhow::Context as _;

use crate::{
    config::VoiceSettings,
    error::{QuizreelError, QuizreelResult},
};

const ELEVENLABS_BASE: &str = "https://api.elevenlabs.io/v1/text-to-speech";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Turns narration text into an audio file on disk. The pipeline only talks
/// to this trait, so tests can substitute a fake that never hits the network.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, text: &str, out_path: &Path) -> QuizreelResult<()>;
}

#[derive(serde::Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs text-to-speech over their REST API. One POST per narration,
/// MP3 bytes in the response body.
pub struct ElevenLabsTts {
    client: reqwest::blocking::Client,
    voice_id: String,
    api_key: String,
    model_id: String,
}

impl ElevenLabsTts {
    pub fn new(voice: &VoiceSettings) -> QuizreelResult<Self> {
        if voice.api_key.trim().is_empty() {
            return Err(QuizreelError::config(
                "voice_settings.api_key must be set to synthesize narration",
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| QuizreelError::synthesis(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            voice_id: voice.voice_id.clone(),
            api_key: voice.api_key.clone(),
            model_id: voice.model_id.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{ELEVENLABS_BASE}/{}", self.voice_id)
    }
}

impl SpeechSynthesizer for ElevenLabsTts {
    fn synthesize(&self, text: &str, out_path: &Path) -> QuizreelResult<()> {
        let preview = snippet(text);
        tracing::info!(%preview, out = %out_path.display(), "synthesizing narration");

        let resp = self
            .client
            .post(self.endpoint())
            .header("xi-api-key", &self.api_key)
            .json(&SynthesisRequest {
                text,
                model_id: &self.model_id,
            })
            .send()
            .map_err(|e| {
                QuizreelError::synthesis(format!("request failed for \"{preview}\": {e}"))
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(QuizreelError::synthesis(format!(
                "ElevenLabs returned {status} for \"{preview}\": {}",
                body.trim()
            )));
        }

        let bytes = resp.bytes().map_err(|e| {
            QuizreelError::synthesis(format!("failed to read audio for \"{preview}\": {e}"))
        })?;
        if bytes.is_empty() {
            return Err(QuizreelError::synthesis(format!(
                "ElevenLabs returned an empty audio body for \"{preview}\""
            )));
        }

        std::fs::write(out_path, &bytes)
            .with_context(|| format!("write narration '{}'", out_path.display()))?;
        Ok(())
    }
}

fn snippet(text: &str) -> String {
    const MAX: usize = 40;
    let mut s: String = text.chars().take(MAX).collect();
    if text.chars().count() > MAX {
        s.push('\u{2026}');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_api_shape() {
        let req = SynthesisRequest {
            text: "Coffee or tea?",
            model_id: "eleven_monolingual_v1",
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["text"], "Coffee or tea?");
        assert_eq!(v["model_id"], "eleven_monolingual_v1");
        assert_eq!(v.as_object().unwrap().len(), 2);
    }

    #[test]
    fn missing_api_key_is_rejected_up_front() {
        let voice = VoiceSettings {
            voice_id: "abc".into(),
            api_key: "  ".into(),
            model_id: "eleven_monolingual_v1".into(),
        };
        assert!(ElevenLabsTts::new(&voice).is_err());
    }

    #[test]
    fn long_text_is_truncated_in_error_context() {
        let long = "x".repeat(200);
        let s = snippet(&long);
        assert!(s.chars().count() <= 41);
        assert!(s.ends_with('\u{2026}'));
        assert_eq!(snippet("short"), "short");
    }
}
