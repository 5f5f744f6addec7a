use std::path::Path;

use anyhow::Context as _;
use fontdue::{
    Font, FontSettings,
    layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle},
};

use crate::{
    error::{QuizreelError, QuizreelResult},
    model::Sprite,
};

/// Vertical gap between wrapped lines, as a fraction of the font size.
const LINE_GAP_FACTOR: f32 = 0.35;
/// Transparent padding around the rasterized text block.
const SPRITE_PAD: u32 = 4;

pub struct CaptionFont {
    font: Font,
}

impl CaptionFont {
    pub fn load(path: &Path) -> QuizreelResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|e| {
            QuizreelError::validation(format!("failed to parse font '{}': {e}", path.display()))
        })?;
        Ok(Self { font })
    }

    /// Advance width of `text` at `px`, ignoring kerning.
    pub fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars()
            .map(|c| self.font.metrics(c, px).advance_width)
            .sum()
    }

    /// Rasterize `text` into a straight-alpha RGBA sprite, word-wrapped to
    /// `max_width` pixels, lines centered within the block.
    pub fn render(
        &self,
        text: &str,
        px: f32,
        max_width: f32,
        color: [u8; 3],
    ) -> QuizreelResult<Sprite> {
        let lines = wrap_lines(text, max_width, |s| self.measure(s, px));
        if lines.is_empty() {
            return Sprite::new(1, 1, vec![0u8; 4]);
        }

        let line_widths: Vec<f32> = lines.iter().map(|l| self.measure(l, px)).collect();
        let content_w = line_widths.iter().fold(0.0f32, |a, &w| a.max(w));
        let line_gap = px * LINE_GAP_FACTOR;
        let content_h = px * lines.len() as f32 + line_gap * (lines.len() - 1) as f32;

        let sprite_w = (content_w.ceil() as u32).max(1) + 2 * SPRITE_PAD;
        let sprite_h = (content_h.ceil() as u32).max(1) + 2 * SPRITE_PAD;
        let mut rgba8 = vec![0u8; sprite_w as usize * sprite_h as usize * 4];

        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        for (i, (line, line_w)) in lines.iter().zip(&line_widths).enumerate() {
            let origin_x = SPRITE_PAD as f32 + (content_w - line_w) / 2.0;
            let origin_y = SPRITE_PAD as f32 + i as f32 * (px + line_gap);

            layout.reset(&LayoutSettings {
                x: origin_x,
                y: origin_y,
                max_width: None,
                ..LayoutSettings::default()
            });
            layout.append(&[&self.font], &TextStyle::new(line, px, 0));

            for glyph in layout.glyphs() {
                if glyph.width == 0 || glyph.height == 0 {
                    continue;
                }
                let (_, coverage) = self.font.rasterize_config(glyph.key);
                blend_glyph(
                    &mut rgba8,
                    sprite_w,
                    sprite_h,
                    glyph.x.round() as i64,
                    glyph.y.round() as i64,
                    glyph.width,
                    glyph.height,
                    &coverage,
                    color,
                );
            }
        }

        Sprite::new(sprite_w, sprite_h, rgba8)
    }
}

/// Greedy word wrap against a pixel budget. A word wider than `max_width`
/// still gets its own line rather than being split.
pub fn wrap_lines(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let trial = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measure(&trial) <= max_width || current.is_empty() {
            current = trial;
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[allow(clippy::too_many_arguments)]
fn blend_glyph(
    rgba8: &mut [u8],
    sprite_w: u32,
    sprite_h: u32,
    gx: i64,
    gy: i64,
    gw: usize,
    gh: usize,
    coverage: &[u8],
    color: [u8; 3],
) {
    for row in 0..gh {
        let py = gy + row as i64;
        if py < 0 || py >= i64::from(sprite_h) {
            continue;
        }
        for col in 0..gw {
            let px = gx + col as i64;
            if px < 0 || px >= i64::from(sprite_w) {
                continue;
            }
            let cov = coverage[row * gw + col];
            if cov == 0 {
                continue;
            }
            let idx = (py as usize * sprite_w as usize + px as usize) * 4;
            rgba8[idx] = color[0];
            rgba8[idx + 1] = color[1];
            rgba8[idx + 2] = color[2];
            rgba8[idx + 3] = rgba8[idx + 3].max(cov);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Fake measure: every character is 10px wide.
    fn measure(s: &str) -> f32 {
        s.chars().count() as f32 * 10.0
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_lines("coffee or tea", 200.0, measure);
        assert_eq!(lines, vec!["coffee or tea"]);
    }

    #[test]
    fn wraps_at_the_pixel_budget() {
        let lines = wrap_lines("one two three four", 80.0, measure);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let lines = wrap_lines("hi supercalifragilistic yo", 50.0, measure);
        assert_eq!(lines, vec!["hi", "supercalifragilistic", "yo"]);
    }

    #[test]
    fn empty_text_produces_no_lines() {
        assert!(wrap_lines("", 100.0, measure).is_empty());
        assert!(wrap_lines("   ", 100.0, measure).is_empty());
    }
}
