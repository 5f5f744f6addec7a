use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::error::{QuizreelError, QuizreelResult};

/// Run settings, loaded once from JSON and immutable afterwards.
///
/// The section names mirror the config file keys: `video_settings`,
/// `timing_settings`, `voice_settings`, `output_settings`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub video_settings: VideoSettings,
    #[serde(default)]
    pub timing_settings: TimingSettings,
    pub voice_settings: VoiceSettings,
    pub output_settings: OutputSettings,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub text_font_size: u32,
    pub font_path: PathBuf,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_brand_text_color")]
    pub brand_text_color: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Trailing silence appended after a question's narration ends.
    pub question_pad_sec: f64,
    /// Pause clip length in the legacy pipeline variant.
    pub pause_duration_sec: f64,
    pub intro_duration_sec: f64,
    pub share_duration_sec: f64,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VoiceSettings {
    pub voice_id: String,
    pub api_key: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct OutputSettings {
    pub output_dir: PathBuf,
    pub output_filename: String,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            question_pad_sec: 3.0,
            pause_duration_sec: 2.0,
            intro_duration_sec: 2.8,
            share_duration_sec: 2.4,
        }
    }
}

fn default_background_color() -> String {
    "#dfe3fd".to_string()
}

fn default_brand_text_color() -> String {
    "#8b8d9b".to_string()
}

fn default_model_id() -> String {
    "eleven_monolingual_v1".to_string()
}

impl Config {
    /// Parse a config file and validate it. Any missing required key or
    /// malformed JSON fails here, before anything downstream runs.
    pub fn load(path: &Path) -> QuizreelResult<Self> {
        let f =
            File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Config = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| QuizreelError::config(format!("invalid config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> QuizreelResult<()> {
        let v = &self.video_settings;
        if v.width == 0 || v.height == 0 {
            return Err(QuizreelError::config("video width/height must be > 0"));
        }
        if !v.width.is_multiple_of(2) || !v.height.is_multiple_of(2) {
            // yuv420p output requires even dimensions.
            return Err(QuizreelError::config(
                "video width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if v.width <= 2 * crate::composer::MARGIN_X {
            return Err(QuizreelError::config(format!(
                "video width must be greater than {} to fit the question margins",
                2 * crate::composer::MARGIN_X
            )));
        }
        if v.fps == 0 {
            return Err(QuizreelError::config("fps must be > 0"));
        }
        if v.text_font_size == 0 {
            return Err(QuizreelError::config("text_font_size must be > 0"));
        }

        parse_hex_rgb(&v.background_color)?;
        parse_hex_rgb(&v.brand_text_color)?;

        let t = &self.timing_settings;
        for (name, value) in [
            ("question_pad_sec", t.question_pad_sec),
            ("pause_duration_sec", t.pause_duration_sec),
            ("intro_duration_sec", t.intro_duration_sec),
            ("share_duration_sec", t.share_duration_sec),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(QuizreelError::config(format!(
                    "timing_settings.{name} must be finite and >= 0"
                )));
            }
        }

        if self.voice_settings.voice_id.trim().is_empty() {
            return Err(QuizreelError::config("voice_id must be non-empty"));
        }
        if self.output_settings.output_filename.trim().is_empty() {
            return Err(QuizreelError::config("output_filename must be non-empty"));
        }

        Ok(())
    }
}

impl VideoSettings {
    pub fn background_rgb(&self) -> QuizreelResult<[u8; 3]> {
        parse_hex_rgb(&self.background_color)
    }

    pub fn text_rgb(&self) -> QuizreelResult<[u8; 3]> {
        parse_hex_rgb(&self.brand_text_color)
    }
}

/// Parse `#rgb` or `#rrggbb` (leading `#` optional) into an RGB triple.
pub fn parse_hex_rgb(s: &str) -> QuizreelResult<[u8; 3]> {
    let hex = s.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return Err(QuizreelError::config(format!(
            "invalid hex color '{s}' (expected #rgb or #rrggbb)"
        )));
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => {
            return Err(QuizreelError::config(format!(
                "invalid hex color '{s}' (expected #rgb or #rrggbb)"
            )));
        }
    };

    let parse = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&expanded[range], 16)
            .map_err(|_| QuizreelError::config(format!("invalid hex color '{s}'")))
    };

    Ok([parse(0..2)?, parse(2..4)?, parse(4..6)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config_json() -> serde_json::Value {
        serde_json::json!({
            "video_settings": {
                "width": 1080,
                "height": 1920,
                "fps": 30,
                "text_font_size": 80,
                "font_path": "fonts/Renogare-Regular.ttf"
            },
            "voice_settings": {
                "voice_id": "pNInz6obpgDQGcFmaJgB",
                "api_key": "sk_test"
            },
            "output_settings": {
                "output_dir": "output",
                "output_filename": "quiz.mp4"
            }
        })
    }

    #[test]
    fn parses_full_config_with_defaults() {
        let cfg: Config = serde_json::from_value(full_config_json()).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.video_settings.width, 1080);
        assert_eq!(cfg.timing_settings.question_pad_sec, 3.0);
        assert_eq!(cfg.voice_settings.model_id, "eleven_monolingual_v1");
        assert_eq!(cfg.video_settings.background_rgb().unwrap(), [0xdf, 0xe3, 0xfd]);
    }

    #[test]
    fn missing_required_key_fails_at_parse() {
        let mut v = full_config_json();
        v["voice_settings"]
            .as_object_mut()
            .unwrap()
            .remove("voice_id");
        assert!(serde_json::from_value::<Config>(v).is_err());
    }

    #[test]
    fn odd_dimensions_are_rejected() {
        let mut v = full_config_json();
        v["video_settings"]["width"] = serde_json::json!(1081);
        let cfg: Config = serde_json::from_value(v).unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn hex_colors_parse_short_and_long_forms() {
        assert_eq!(parse_hex_rgb("#fff").unwrap(), [255, 255, 255]);
        assert_eq!(parse_hex_rgb("dfe3fd").unwrap(), [0xdf, 0xe3, 0xfd]);
        assert!(parse_hex_rgb("#dfe3").is_err());
        assert!(parse_hex_rgb("#zzzzzz").is_err());
    }

    #[test]
    fn non_ascii_hex_colors_are_a_config_error() {
        // "€aaa" is 6 bytes, so it must be caught before any byte slicing.
        assert!(parse_hex_rgb("€aaa").is_err());
        assert!(parse_hex_rgb("#€aaa").is_err());
        assert!(parse_hex_rgb("日本語").is_err());
    }

    #[test]
    fn widths_too_narrow_for_margins_are_rejected() {
        let mut v = full_config_json();
        v["video_settings"]["width"] = serde_json::json!(108);
        let cfg: Config = serde_json::from_value(v).unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("margins"));
    }
}
