//! Vertical quiz video generator.
//!
//! Turns a JSON config, a question list, and per-question image pairs into a
//! ready-to-post MP4: narration is synthesized per section, captions are
//! rasterized and animated in, and clips are encoded and concatenated with a
//! system `ffmpeg`.
//!
//! The pipeline runs in a fixed order: intro, hook, share prompt, then one
//! clip per question whose length follows its narration.

#![forbid(unsafe_code)]

pub mod anim;
pub mod caption;
pub mod composer;
pub mod config;
pub mod content;
pub mod encode_ffmpeg;
pub mod error;
pub mod image_prep;
pub mod job;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod timeline;
pub mod tts;

pub use config::Config;
pub use content::ImagePair;
pub use error::{QuizreelError, QuizreelResult};
pub use job::{JobEvent, RenderJob};
pub use pipeline::{Generator, RenderRequest};
pub use tts::{ElevenLabsTts, SpeechSynthesizer};
