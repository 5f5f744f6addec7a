use std::path::PathBuf;

use crate::{
    anim::CaptionMotion,
    error::{QuizreelError, QuizreelResult},
};

/// What a clip is for. Determines layout and where its duration comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ClipRole {
    Intro,
    Hook,
    Share,
    Question,
    Pause,
}

impl ClipRole {
    pub fn label(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Hook => "hook",
            Self::Share => "share",
            Self::Question => "question",
            Self::Pause => "pause",
        }
    }
}

/// Straight-alpha RGBA pixels, row-major.
#[derive(Clone, Debug)]
pub struct Sprite {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

impl Sprite {
    pub fn new(width: u32, height: u32, rgba8: Vec<u8>) -> QuizreelResult<Self> {
        if rgba8.len() != width as usize * height as usize * 4 {
            return Err(QuizreelError::validation(format!(
                "sprite buffer is {} bytes, expected {} for {width}x{height} rgba8",
                rgba8.len(),
                width as usize * height as usize * 4
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8,
        })
    }
}

/// One positioned visual element inside a clip. Layers are composited in
/// order; `motion` marks a caption that slides in and fades.
#[derive(Clone, Debug)]
pub struct Layer {
    pub sprite: Sprite,
    pub x: i64,
    pub y: i64,
    pub motion: Option<CaptionMotion>,
}

/// A timed layer stack over a solid background, plus optional audio.
#[derive(Clone, Debug)]
pub struct ClipSpec {
    pub role: ClipRole,
    pub duration_sec: f64,
    pub background: [u8; 3],
    pub layers: Vec<Layer>,
    pub audio: Option<PathBuf>,
}

impl ClipSpec {
    pub fn validate(&self) -> QuizreelResult<()> {
        if !self.duration_sec.is_finite() || self.duration_sec <= 0.0 {
            return Err(QuizreelError::validation(format!(
                "{} clip duration must be > 0 (got {})",
                self.role.label(),
                self.duration_sec
            )));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.sprite.rgba8.len()
                != layer.sprite.width as usize * layer.sprite.height as usize * 4
            {
                return Err(QuizreelError::validation(format!(
                    "{} clip layer {i} has an inconsistent sprite buffer",
                    self.role.label()
                )));
            }
        }
        Ok(())
    }
}
