use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    error::{QuizreelError, QuizreelResult},
    render::{FrameRgba, frame_count},
};

pub const AUDIO_SAMPLE_RATE: u32 = 44_100;

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

/// Audio source muxed into a clip: narration from a file (padded with
/// silence to the clip length) or pure silence.
#[derive(Clone, Debug)]
pub enum ClipAudio {
    Silence,
    File(PathBuf),
}

impl EncodeConfig {
    pub fn validate(&self) -> QuizreelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(QuizreelError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(QuizreelError::validation("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // We target yuv420p output for maximum player compatibility.
            return Err(QuizreelError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

pub fn default_mp4_config(
    out_path: impl Into<PathBuf>,
    width: u32,
    height: u32,
    fps: u32,
) -> EncodeConfig {
    EncodeConfig {
        width,
        height,
        fps,
        out_path: out_path.into(),
        overwrite: true,
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> QuizreelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Build the full ffmpeg argument list for one clip: raw RGBA video on
/// stdin, the audio source as a second input, AAC-padded to exactly the
/// clip's frame-aligned duration.
pub fn build_encode_args(cfg: &EncodeConfig, audio: &ClipAudio, duration_sec: f64) -> Vec<String> {
    // Align -t to whole frames so audio padding never outlives the video.
    let frames = frame_count(duration_sec, cfg.fps);
    let t = frames as f64 / f64::from(cfg.fps);

    let mut args: Vec<String> = vec![
        if cfg.overwrite { "-y" } else { "-n" }.to_string(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgba".into(),
        "-s".into(),
        format!("{}x{}", cfg.width, cfg.height),
        "-r".into(),
        cfg.fps.to_string(),
        "-i".into(),
        "pipe:0".into(),
    ];

    match audio {
        ClipAudio::File(path) => {
            args.push("-i".into());
            args.push(path.display().to_string());
        }
        ClipAudio::Silence => {
            args.push("-f".into());
            args.push("lavfi".into());
            args.push("-i".into());
            args.push(format!("anullsrc=r={AUDIO_SAMPLE_RATE}:cl=stereo"));
        }
    }

    args.extend(
        [
            "-map",
            "0:v",
            "-map",
            "1:a",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-ar",
            &AUDIO_SAMPLE_RATE.to_string(),
            "-ac",
            "2",
            "-af",
            "apad",
            "-t",
            &format!("{t:.6}"),
            "-movflags",
            "+faststart",
        ]
        .into_iter()
        .map(String::from),
    );
    args.push(cfg.out_path.display().to_string());
    args
}

/// Pipes raw RGBA frames into a system `ffmpeg` process that encodes one
/// clip MP4 with an AAC audio track.
///
/// We intentionally shell out to `ffmpeg` rather than binding libav to avoid
/// native dev header/lib requirements.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig, audio: &ClipAudio, duration_sec: f64) -> QuizreelResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(QuizreelError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if let ClipAudio::File(path) = audio
            && !path.exists()
        {
            return Err(QuizreelError::encode(format!(
                "clip audio file '{}' does not exist",
                path.display()
            )));
        }

        let args = build_encode_args(&cfg, audio, duration_sec);
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                QuizreelError::encode(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| QuizreelError::encode("failed to open ffmpeg stdin (unexpected)"))?;

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
        })
    }

    pub fn encode_frame(&mut self, frame: &FrameRgba) -> QuizreelResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(QuizreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(QuizreelError::encode("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&frame.data).map_err(|e| {
            QuizreelError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;

        Ok(())
    }

    pub fn finish(mut self) -> QuizreelResult<()> {
        drop(self.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .map_err(|e| QuizreelError::encode(format!("failed to wait for ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(QuizreelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Concatenate already-encoded clip MP4s with the concat demuxer. All clips
/// share codecs and parameters, so this is a lossless stream copy.
pub fn concat_mp4s(clips: &[PathBuf], out_path: &Path) -> QuizreelResult<()> {
    if clips.is_empty() {
        return Err(QuizreelError::validation("no clips to concatenate"));
    }
    ensure_parent_dir(out_path)?;

    let list_path = out_path.with_extension("concat.txt");
    let mut list = String::new();
    for clip in clips {
        use anyhow::Context as _;
        let abs = std::fs::canonicalize(clip)
            .with_context(|| format!("resolve clip path '{}'", clip.display()))?;
        list.push_str(&concat_list_entry(&abs));
    }
    {
        use anyhow::Context as _;
        std::fs::write(&list_path, list)
            .with_context(|| format!("write concat list '{}'", list_path.display()))?;
    }

    let output = Command::new("ffmpeg")
        .args(["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
        .arg(&list_path)
        .args(["-c", "copy"])
        .arg(out_path)
        .output()
        .map_err(|e| QuizreelError::encode(format!("failed to run ffmpeg concat: {e}")))?;

    let _ = std::fs::remove_file(&list_path);

    if !output.status.success() {
        return Err(QuizreelError::encode(format!(
            "ffmpeg concat failed for '{}': {}",
            out_path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(())
}

/// One line of a concat demuxer list. Single quotes inside the quoted path
/// must be closed, escaped, and reopened for ffmpeg to parse them.
fn concat_list_entry(path: &Path) -> String {
    let quoted = path.display().to_string().replace('\'', r"'\''");
    format!("file '{quoted}'\n")
}

/// Duration of an audio file in seconds, via `ffprobe`.
pub fn probe_audio_duration(path: &Path) -> QuizreelResult<f64> {
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .map_err(|e| QuizreelError::encode(format!("failed to run ffprobe: {e}")))?;

    if !out.status.success() {
        return Err(QuizreelError::encode(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| QuizreelError::encode(format!("ffprobe json parse failed: {e}")))?;

    parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            QuizreelError::encode(format!(
                "ffprobe reported no usable duration for '{}'",
                path.display()
            ))
        })
}
