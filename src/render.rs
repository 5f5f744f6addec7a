use crate::{
    error::{QuizreelError, QuizreelResult},
    model::{ClipSpec, Sprite},
};

/// One opaque RGBA8 frame, row-major.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

pub fn frame_count(duration_sec: f64, fps: u32) -> u64 {
    ((duration_sec * f64::from(fps)).round() as u64).max(1)
}

/// Render every frame of `clip` at `fps` and hand each to `sink` in order.
///
/// The background plus static layers are composited once; animated captions
/// are re-blitted per frame at their eased offset and opacity.
pub fn render_clip(
    clip: &ClipSpec,
    width: u32,
    height: u32,
    fps: u32,
    mut sink: impl FnMut(&FrameRgba) -> QuizreelResult<()>,
) -> QuizreelResult<()> {
    clip.validate()?;
    if width == 0 || height == 0 || fps == 0 {
        return Err(QuizreelError::validation(
            "render dimensions and fps must be non-zero",
        ));
    }

    let mut base = FrameRgba {
        width,
        height,
        data: vec![0u8; width as usize * height as usize * 4],
    };
    fill_background(&mut base, clip.background);
    for layer in clip.layers.iter().filter(|l| l.motion.is_none()) {
        blit_over(&mut base, &layer.sprite, layer.x, layer.y, 1.0);
    }

    let frames = frame_count(clip.duration_sec, fps);
    let mut scratch = base.clone();
    for fi in 0..frames {
        let t = fi as f64 / f64::from(fps);
        scratch.data.copy_from_slice(&base.data);

        for layer in &clip.layers {
            let Some(motion) = layer.motion else {
                continue;
            };
            let offset = motion.offset_y(t).round() as i64;
            let opacity = motion.opacity(t, clip.duration_sec);
            if opacity <= 0.0 {
                continue;
            }
            blit_over(&mut scratch, &layer.sprite, layer.x, layer.y + offset, opacity);
        }

        sink(&scratch)?;
    }

    Ok(())
}

pub fn fill_background(frame: &mut FrameRgba, rgb: [u8; 3]) {
    for px in frame.data.chunks_exact_mut(4) {
        px[0] = rgb[0];
        px[1] = rgb[1];
        px[2] = rgb[2];
        px[3] = 255;
    }
}

/// Straight-alpha "over" blit of `sprite` onto an opaque frame at (x, y),
/// clipped at the frame edges, with an extra global `opacity` multiplier.
pub fn blit_over(frame: &mut FrameRgba, sprite: &Sprite, x: i64, y: i64, opacity: f64) {
    let opacity_q = (opacity.clamp(0.0, 1.0) * 255.0).round() as u16;
    if opacity_q == 0 {
        return;
    }

    for row in 0..sprite.height as i64 {
        let fy = y + row;
        if fy < 0 || fy >= i64::from(frame.height) {
            continue;
        }
        for col in 0..sprite.width as i64 {
            let fx = x + col;
            if fx < 0 || fx >= i64::from(frame.width) {
                continue;
            }

            let sidx = ((row * sprite.width as i64 + col) * 4) as usize;
            let a = mul_div255(u16::from(sprite.rgba8[sidx + 3]), opacity_q);
            if a == 0 {
                continue;
            }
            let inv = 255 - a;

            let didx = ((fy * i64::from(frame.width) + fx) * 4) as usize;
            for c in 0..3 {
                let src = u16::from(sprite.rgba8[sidx + c]);
                let dst = u16::from(frame.data[didx + c]);
                frame.data[didx + c] = (mul_div255(src, a) + mul_div255(dst, inv)).min(255) as u8;
            }
            frame.data[didx + 3] = 255;
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        anim::CaptionMotion,
        model::{ClipRole, ClipSpec, Layer},
    };

    fn solid_sprite(w: u32, h: u32, rgba: [u8; 4]) -> Sprite {
        let mut data = Vec::with_capacity((w * h * 4) as usize);
        for _ in 0..w * h {
            data.extend_from_slice(&rgba);
        }
        Sprite::new(w, h, data).unwrap()
    }

    #[test]
    fn frame_count_rounds_and_is_at_least_one() {
        assert_eq!(frame_count(1.0, 30), 30);
        assert_eq!(frame_count(7.2, 30), 216);
        assert_eq!(frame_count(0.01, 30), 1);
    }

    #[test]
    fn opaque_blit_replaces_destination() {
        let mut frame = FrameRgba {
            width: 4,
            height: 4,
            data: vec![0u8; 64],
        };
        fill_background(&mut frame, [10, 20, 30]);
        blit_over(&mut frame, &solid_sprite(2, 2, [255, 0, 0, 255]), 1, 1, 1.0);

        // Pixel inside the sprite.
        let idx = (1 * 4 + 1) * 4;
        assert_eq!(&frame.data[idx..idx + 4], &[255, 0, 0, 255]);
        // Pixel outside stays background.
        assert_eq!(&frame.data[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn half_opacity_blit_blends_toward_source() {
        let mut frame = FrameRgba {
            width: 1,
            height: 1,
            data: vec![0, 0, 0, 255],
        };
        blit_over(&mut frame, &solid_sprite(1, 1, [255, 0, 0, 255]), 0, 0, 0.5);
        assert_eq!(frame.data[0], 128);
        assert_eq!(frame.data[1], 0);
        assert_eq!(frame.data[3], 255);
    }

    #[test]
    fn out_of_bounds_blit_is_clipped() {
        let mut frame = FrameRgba {
            width: 2,
            height: 2,
            data: vec![0u8; 16],
        };
        fill_background(&mut frame, [0, 0, 0]);
        blit_over(&mut frame, &solid_sprite(4, 4, [255, 255, 255, 255]), -2, -2, 1.0);
        // Only the overlapping corner is written; no panic.
        assert_eq!(&frame.data[0..4], &[255, 255, 255, 255]);
    }

    #[test]
    fn render_emits_expected_frame_count() {
        let clip = ClipSpec {
            role: ClipRole::Pause,
            duration_sec: 2.0,
            background: [5, 5, 5],
            layers: vec![],
            audio: None,
        };
        let mut seen = 0u64;
        render_clip(&clip, 8, 8, 10, |frame| {
            assert_eq!(frame.data.len(), 8 * 8 * 4);
            seen += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, 20);
    }

    #[test]
    fn animated_caption_is_faded_out_on_first_frame() {
        let clip = ClipSpec {
            role: ClipRole::Hook,
            duration_sec: 2.0,
            background: [0, 0, 0],
            layers: vec![Layer {
                sprite: solid_sprite(2, 2, [255, 255, 255, 255]),
                x: 0,
                y: 0,
                motion: Some(CaptionMotion::default()),
            }],
            audio: None,
        };

        let mut first: Option<Vec<u8>> = None;
        let mut mid: Option<Vec<u8>> = None;
        let mut fi = 0u64;
        render_clip(&clip, 4, 4, 10, |frame| {
            if fi == 0 {
                first = Some(frame.data.clone());
            }
            if fi == 10 {
                mid = Some(frame.data.clone());
            }
            fi += 1;
            Ok(())
        })
        .unwrap();

        // t=0: opacity 0 and the sprite is slid 60px below its resting spot.
        assert_eq!(&first.unwrap()[0..4], &[0, 0, 0, 255]);
        // t=1.0s: fully faded in and settled at (0, 0).
        assert_eq!(&mid.unwrap()[0..4], &[255, 255, 255, 255]);
    }
}
