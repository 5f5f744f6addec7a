#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    Linear,
    OutQuad,
    InOutQuad,
    OutCubic,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Entrance/exit animation applied to caption layers: the sprite starts
/// `slide_px` below its resting position and eases up over `slide_sec`,
/// with symmetric opacity fades at both ends of the clip.
#[derive(Clone, Copy, Debug)]
pub struct CaptionMotion {
    pub slide_px: f64,
    pub slide_sec: f64,
    pub fade_sec: f64,
    pub ease: Ease,
}

impl Default for CaptionMotion {
    fn default() -> Self {
        Self {
            slide_px: 60.0,
            slide_sec: 0.5,
            fade_sec: 0.4,
            ease: Ease::OutQuad,
        }
    }
}

impl CaptionMotion {
    /// Vertical offset below the resting position at clip-local time `t`.
    pub fn offset_y(&self, t: f64) -> f64 {
        if self.slide_sec <= 0.0 || t >= self.slide_sec {
            return 0.0;
        }
        let progress = self.ease.apply((t / self.slide_sec).max(0.0));
        (1.0 - progress) * self.slide_px
    }

    /// Opacity at clip-local time `t` for a clip of `duration` seconds.
    pub fn opacity(&self, t: f64, duration: f64) -> f64 {
        if self.fade_sec <= 0.0 {
            return 1.0;
        }
        let fade_in = (t / self.fade_sec).clamp(0.0, 1.0);
        let fade_out = ((duration - t) / self.fade_sec).clamp(0.0, 1.0);
        fade_in.min(fade_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_endpoints_are_stable() {
        for ease in [Ease::Linear, Ease::OutQuad, Ease::InOutQuad, Ease::OutCubic] {
            assert_eq!(ease.apply(0.0), 0.0);
            assert_eq!(ease.apply(1.0), 1.0);
        }
    }

    #[test]
    fn ease_monotonic_spot_check() {
        for ease in [Ease::Linear, Ease::OutQuad, Ease::InOutQuad, Ease::OutCubic] {
            let a = ease.apply(0.25);
            let b = ease.apply(0.5);
            let c = ease.apply(0.75);
            assert!(a < b);
            assert!(b < c);
        }
    }

    #[test]
    fn slide_starts_offset_and_settles() {
        let m = CaptionMotion::default();
        assert_eq!(m.offset_y(0.0), 60.0);
        let mid = m.offset_y(0.25);
        assert!(mid > 0.0 && mid < 60.0);
        assert_eq!(m.offset_y(0.5), 0.0);
        assert_eq!(m.offset_y(3.0), 0.0);
    }

    #[test]
    fn opacity_fades_symmetrically() {
        let m = CaptionMotion::default();
        assert_eq!(m.opacity(0.0, 4.0), 0.0);
        assert_eq!(m.opacity(0.2, 4.0), 0.5);
        assert_eq!(m.opacity(2.0, 4.0), 1.0);
        assert!((m.opacity(3.8, 4.0) - 0.5).abs() < 1e-9);
        assert_eq!(m.opacity(4.0, 4.0), 0.0);
    }
}
