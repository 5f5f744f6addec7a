use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{Rgb, RgbImage, imageops};

use crate::{
    error::{QuizreelError, QuizreelResult},
    model::Sprite,
};

/// Center-crop `path` to a square on its shorter side, resample to
/// `size`x`size` with Lanczos3, and save as JPEG in `out_dir`.
///
/// Deterministic for a given input and target size; output dimensions are
/// always exactly `size`x`size`.
pub fn prepare_square(path: &Path, size: u32, out_dir: &Path) -> QuizreelResult<PathBuf> {
    if size == 0 {
        return Err(QuizreelError::validation("square size must be > 0"));
    }
    let img = image::open(path)
        .with_context(|| format!("decode image '{}'", path.display()))?
        .to_rgb8();

    let (w, h) = img.dimensions();
    let side = w.min(h);
    let left = (w - side) / 2;
    let top = (h - side) / 2;
    let cropped = imageops::crop_imm(&img, left, top, side, side).to_image();
    let resized = imageops::resize(&cropped, size, size, imageops::FilterType::Lanczos3);

    let out_path = out_dir.join(format!("_resized_{}.jpg", file_stem(path)));
    save_jpeg(&resized, &out_path)?;
    tracing::debug!(src = %path.display(), out = %out_path.display(), size, "prepared square image");
    Ok(out_path)
}

/// Fit `path` inside a `width`x`height` frame, preserving aspect ratio and
/// letterboxing onto black. Used by the legacy full-frame pipeline.
pub fn prepare_frame(
    path: &Path,
    width: u32,
    height: u32,
    out_dir: &Path,
) -> QuizreelResult<PathBuf> {
    if width == 0 || height == 0 {
        return Err(QuizreelError::validation("frame dimensions must be > 0"));
    }
    let img = image::open(path)
        .with_context(|| format!("decode image '{}'", path.display()))?
        .to_rgb8();

    let (w, h) = img.dimensions();
    let src_ratio = f64::from(w) / f64::from(h);
    let dst_ratio = f64::from(width) / f64::from(height);

    let (fit_w, fit_h) = if src_ratio > dst_ratio {
        (width, (f64::from(width) / src_ratio).round().max(1.0) as u32)
    } else {
        ((f64::from(height) * src_ratio).round().max(1.0) as u32, height)
    };

    let resized = imageops::resize(&img, fit_w, fit_h, imageops::FilterType::Lanczos3);
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    let x = i64::from((width - fit_w) / 2);
    let y = i64::from((height - fit_h) / 2);
    imageops::overlay(&mut canvas, &resized, x, y);

    let out_path = out_dir.join(format!("resized_{}.jpg", file_stem(path)));
    save_jpeg(&canvas, &out_path)?;
    Ok(out_path)
}

/// Load an image from disk as an opaque RGBA sprite for compositing.
pub fn load_sprite(path: &Path) -> QuizreelResult<Sprite> {
    let rgba = image::open(path)
        .with_context(|| format!("decode image '{}'", path.display()))?
        .to_rgba8();
    let (w, h) = rgba.dimensions();
    Sprite::new(w, h, rgba.into_raw())
}

const PLACEHOLDER_COLORS: [[u8; 3]; 5] = [
    [210, 230, 255],
    [200, 210, 240],
    [230, 220, 255],
    [220, 255, 230],
    [255, 230, 220],
];

/// Generate two solid-color 1080x1080 placeholder images per question, for
/// testing runs without real artwork. Returns flat paths in pair order.
pub fn placeholder_pairs(count: usize, out_dir: &Path) -> QuizreelResult<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;

    let mut paths = Vec::with_capacity(count * 2);
    for i in 0..count {
        let color_a = PLACEHOLDER_COLORS[i % PLACEHOLDER_COLORS.len()];
        let color_b = PLACEHOLDER_COLORS[(i + 2) % PLACEHOLDER_COLORS.len()];
        for (variant, color) in [("A", color_a), ("B", color_b)] {
            let img = RgbImage::from_pixel(1080, 1080, Rgb(color));
            let path = out_dir.join(format!("placeholder_q{}_{variant}.jpg", i + 1));
            save_jpeg(&img, &path)?;
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Delete generated placeholder files once a run has succeeded. Missing
/// files are ignored.
pub fn cleanup_placeholders(paths: &[PathBuf]) {
    for path in paths {
        let _ = std::fs::remove_file(path);
    }
}

fn save_jpeg(img: &RgbImage, path: &Path) -> QuizreelResult<()> {
    img.save_with_format(path, image::ImageFormat::Jpeg)
        .with_context(|| format!("write jpeg '{}'", path.display()))?;
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_image(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_pixel(w, h, Rgb([90, 120, 200]));
        img.save_with_format(&path, image::ImageFormat::Png).unwrap();
        path
    }

    #[test]
    fn square_output_has_exact_dimensions_for_any_aspect() {
        let dir = tempfile::tempdir().unwrap();
        for (w, h) in [(300, 200), (200, 300), (128, 128)] {
            let src = write_test_image(dir.path(), &format!("src_{w}x{h}.png"), w, h);
            let out = prepare_square(&src, 100, dir.path()).unwrap();
            let img = image::open(&out).unwrap();
            assert_eq!((img.width(), img.height()), (100, 100));
        }
    }

    #[test]
    fn frame_output_is_letterboxed_to_target() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_test_image(dir.path(), "wide.png", 400, 100);
        let out = prepare_frame(&src, 108, 192, dir.path()).unwrap();
        let img = image::open(&out).unwrap();
        assert_eq!((img.width(), img.height()), (108, 192));
    }

    #[test]
    fn placeholders_come_two_per_question() {
        let dir = tempfile::tempdir().unwrap();
        let paths = placeholder_pairs(3, dir.path()).unwrap();
        assert_eq!(paths.len(), 6);
        for p in &paths {
            assert!(p.exists());
        }
        let first = image::open(&paths[0]).unwrap();
        assert_eq!((first.width(), first.height()), (1080, 1080));
    }

    #[test]
    fn cleanup_removes_placeholder_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = placeholder_pairs(2, dir.path()).unwrap();
        cleanup_placeholders(&paths);
        for p in &paths {
            assert!(!p.exists());
        }
        // A second pass over already-deleted files is harmless.
        cleanup_placeholders(&paths);
    }

    #[test]
    fn zero_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_test_image(dir.path(), "x.png", 10, 10);
        assert!(prepare_square(&src, 0, dir.path()).is_err());
    }
}
