use std::path::{Path, PathBuf};

use crate::{
    anim::CaptionMotion,
    caption::CaptionFont,
    config::Config,
    content::ImagePair,
    error::QuizreelResult,
    image_prep,
    model::{ClipRole, ClipSpec, Layer, Sprite},
};

const INTRO_TITLE: &str = "Couples Quiz!";
const INTRO_THEME_LABEL: &str = "Today's theme is:";
const SHARE_PROMPT: &str = "save and share this with them!";
const OR_LABEL: &str = "Or";

/// Horizontal margin around question text and images. Config validation
/// rejects widths that cannot fit it on both sides.
pub(crate) const MARGIN_X: u32 = 90;
/// Square question images never exceed this edge length.
const MAX_IMAGE_SIZE: u32 = 900;

/// Builds one `ClipSpec` per content unit using the fixed layout: captions
/// centered horizontally, question images stacked with an "Or" label between.
pub struct Composer {
    width: u32,
    height: u32,
    base_font_px: f32,
    background: [u8; 3],
    text_color: [u8; 3],
    font: CaptionFont,
    timing_intro_sec: f64,
    timing_share_sec: f64,
    timing_pause_sec: f64,
    out_dir: PathBuf,
}

impl Composer {
    pub fn new(cfg: &Config, out_dir: &Path) -> QuizreelResult<Self> {
        let v = &cfg.video_settings;
        Ok(Self {
            width: v.width,
            height: v.height,
            base_font_px: v.text_font_size as f32,
            background: v.background_rgb()?,
            text_color: v.text_rgb()?,
            font: CaptionFont::load(&v.font_path)?,
            timing_intro_sec: cfg.timing_settings.intro_duration_sec,
            timing_share_sec: cfg.timing_settings.share_duration_sec,
            timing_pause_sec: cfg.timing_settings.pause_duration_sec,
            out_dir: out_dir.to_path_buf(),
        })
    }

    pub fn intro(&self, theme: &str) -> QuizreelResult<ClipSpec> {
        let title_width = self.width as f32 * 0.9;
        let layers = vec![
            self.caption(INTRO_TITLE, self.base_font_px * 1.2, title_width, 220)?,
            self.caption(INTRO_THEME_LABEL, self.base_font_px, title_width, 420)?,
            self.caption(theme, self.base_font_px * 1.1, title_width, 560)?,
        ];
        self.finish(ClipRole::Intro, self.timing_intro_sec, layers, None)
    }

    pub fn hook(&self, text: &str, audio: &Path, narration_sec: f64) -> QuizreelResult<ClipSpec> {
        let max_width = self.width as f32 * 0.9;
        let y = self.height as i64 / 2 - self.base_font_px as i64;
        let layers = vec![self.caption(text, self.base_font_px, max_width, y)?];
        self.finish(
            ClipRole::Hook,
            narration_sec,
            layers,
            Some(audio.to_path_buf()),
        )
    }

    pub fn share(&self) -> QuizreelResult<ClipSpec> {
        let max_width = self.width as f32 * 0.9;
        let y = self.height as i64 / 2 - self.base_font_px as i64;
        let layers = vec![self.caption(SHARE_PROMPT, self.base_font_px * 1.05, max_width, y)?];
        self.finish(ClipRole::Share, self.timing_share_sec, layers, None)
    }

    /// Question layout, top to bottom: wrapped question text, top image,
    /// "Or", bottom image. Duration = narration + pad, decided by the plan.
    pub fn question(
        &self,
        text: &str,
        images: &ImagePair,
        audio: &Path,
        duration_sec: f64,
    ) -> QuizreelResult<ClipSpec> {
        let question_px = self.base_font_px * 1.1;
        let or_px = self.base_font_px * 0.9;
        let max_text_width = (self.width - 2 * MARGIN_X) as f32;
        let img_size = (self.width - 2 * MARGIN_X).min(MAX_IMAGE_SIZE);

        let top_path = image_prep::prepare_square(&images.top, img_size, &self.out_dir)?;
        let bottom_path = image_prep::prepare_square(&images.bottom, img_size, &self.out_dir)?;
        let top_sprite = image_prep::load_sprite(&top_path)?;
        let bottom_sprite = image_prep::load_sprite(&bottom_path)?;

        let y_text = 100i64;
        let y_top_img = y_text + (question_px * 2.2) as i64;
        let y_or = y_top_img + i64::from(img_size) + 30;
        let y_bottom_img = y_or + (or_px * 1.6) as i64;
        let img_x = i64::from((self.width - img_size) / 2);

        let layers = vec![
            Layer {
                sprite: top_sprite,
                x: img_x,
                y: y_top_img,
                motion: None,
            },
            self.caption(OR_LABEL, or_px, 200.0, y_or)?,
            Layer {
                sprite: bottom_sprite,
                x: img_x,
                y: y_bottom_img,
                motion: None,
            },
            self.caption(text, question_px, max_text_width, y_text)?,
        ];
        self.finish(
            ClipRole::Question,
            duration_sec,
            layers,
            Some(audio.to_path_buf()),
        )
    }

    pub fn pause(&self, clock_audio: Option<&Path>) -> QuizreelResult<ClipSpec> {
        self.finish(
            ClipRole::Pause,
            self.timing_pause_sec,
            Vec::new(),
            clock_audio.map(Path::to_path_buf),
        )
    }

    fn caption(
        &self,
        text: &str,
        px: f32,
        max_width: f32,
        y: impl Into<i64>,
    ) -> QuizreelResult<Layer> {
        let sprite = self.font.render(text, px, max_width, self.text_color)?;
        Ok(Layer {
            x: self.centered_x(&sprite),
            y: y.into(),
            sprite,
            motion: Some(CaptionMotion::default()),
        })
    }

    fn centered_x(&self, sprite: &Sprite) -> i64 {
        (i64::from(self.width) - i64::from(sprite.width)) / 2
    }

    fn finish(
        &self,
        role: ClipRole,
        duration_sec: f64,
        layers: Vec<Layer>,
        audio: Option<PathBuf>,
    ) -> QuizreelResult<ClipSpec> {
        let clip = ClipSpec {
            role,
            duration_sec,
            background: self.background,
            layers,
            audio,
        };
        clip.validate()?;
        Ok(clip)
    }
}
