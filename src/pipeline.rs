use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    composer::Composer,
    config::Config,
    content::ImagePair,
    encode_ffmpeg::{
        ClipAudio, FfmpegEncoder, concat_mp4s, default_mp4_config, is_ffmpeg_on_path,
        probe_audio_duration,
    },
    error::{QuizreelError, QuizreelResult},
    model::{ClipRole, ClipSpec},
    render::render_clip,
    timeline::{TimelinePlan, plan_timeline, validate_counts},
    tts::SpeechSynthesizer,
};

/// Everything one render run needs beyond the config file.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    pub theme: String,
    pub hook: String,
    pub questions: Vec<String>,
    pub image_pairs: Vec<ImagePair>,
    /// Ticking-clock audio for pause clips in the legacy variant.
    pub clock_audio: Option<PathBuf>,
    /// Insert a pause clip between consecutive questions.
    pub legacy_pauses: bool,
    /// Overrides `output_settings` when set.
    pub output_path: Option<PathBuf>,
}

/// Runs the whole pipeline: synthesize narration, plan the timeline, compose
/// and encode each clip, then concatenate into the final MP4.
pub struct Generator {
    cfg: Config,
    synth: Box<dyn SpeechSynthesizer>,
}

impl Generator {
    pub fn new(cfg: Config, synth: Box<dyn SpeechSynthesizer>) -> Self {
        Self { cfg, synth }
    }

    pub fn generate(&self, req: &RenderRequest) -> QuizreelResult<PathBuf> {
        self.generate_with_progress(req, &mut |_| {})
    }

    /// Like [`Generator::generate`], reporting each stage through `progress`.
    ///
    /// All cheap validation runs before the first synthesis call, so count
    /// mismatches and bad configs never cost an API request.
    pub fn generate_with_progress(
        &self,
        req: &RenderRequest,
        progress: &mut dyn FnMut(&str),
    ) -> QuizreelResult<PathBuf> {
        validate_counts(req.questions.len(), req.image_pairs.len())?;
        self.cfg.validate()?;
        if req.hook.trim().is_empty() {
            return Err(QuizreelError::validation("hook text must be non-empty"));
        }
        if !is_ffmpeg_on_path() {
            return Err(QuizreelError::encode(
                "ffmpeg not found on PATH; install it to render video",
            ));
        }

        let out_dir = self.cfg.output_settings.output_dir.clone();
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("create output dir '{}'", out_dir.display()))?;

        progress("Synthesizing narration...");
        let hook_audio = out_dir.join("hook.mp3");
        self.synth.synthesize(&req.hook, &hook_audio)?;
        let hook_sec = probe_audio_duration(&hook_audio)?;

        let mut question_audio = Vec::with_capacity(req.questions.len());
        let mut question_secs = Vec::with_capacity(req.questions.len());
        for (i, question) in req.questions.iter().enumerate() {
            progress(&format!(
                "Synthesizing question {} of {}...",
                i + 1,
                req.questions.len()
            ));
            let path = out_dir.join(format!("question_{}.mp3", i + 1));
            self.synth.synthesize(question, &path)?;
            question_secs.push(probe_audio_duration(&path)?);
            question_audio.push(path);
        }

        let plan = plan_timeline(
            hook_sec,
            &question_secs,
            &self.cfg.timing_settings,
            req.legacy_pauses,
        )?;
        tracing::info!(
            clips = plan.clips.len(),
            total_sec = plan.total_duration_sec(),
            "timeline planned"
        );

        let composer = Composer::new(&self.cfg, &out_dir)?;
        let clip_paths = self.render_plan(
            &plan,
            &composer,
            req,
            &hook_audio,
            &question_audio,
            hook_sec,
            &out_dir,
            progress,
        )?;

        let final_path = req
            .output_path
            .clone()
            .unwrap_or_else(|| out_dir.join(&self.cfg.output_settings.output_filename));
        progress("Assembling final video...");
        concat_mp4s(&clip_paths, &final_path)?;

        for clip in &clip_paths {
            let _ = std::fs::remove_file(clip);
        }

        tracing::info!(out = %final_path.display(), "render complete");
        Ok(final_path)
    }

    #[allow(clippy::too_many_arguments)]
    fn render_plan(
        &self,
        plan: &TimelinePlan,
        composer: &Composer,
        req: &RenderRequest,
        hook_audio: &Path,
        question_audio: &[PathBuf],
        hook_sec: f64,
        out_dir: &Path,
        progress: &mut dyn FnMut(&str),
    ) -> QuizreelResult<Vec<PathBuf>> {
        let v = &self.cfg.video_settings;
        let mut clip_paths = Vec::with_capacity(plan.clips.len());

        for (i, planned) in plan.clips.iter().enumerate() {
            progress(&format!(
                "Rendering {} clip ({} of {})...",
                planned.role.label(),
                i + 1,
                plan.clips.len()
            ));

            let spec = match planned.role {
                ClipRole::Intro => composer.intro(&req.theme)?,
                ClipRole::Hook => composer.hook(&req.hook, hook_audio, hook_sec)?,
                ClipRole::Share => composer.share()?,
                ClipRole::Question => {
                    let qi = planned.question_index.ok_or_else(|| {
                        QuizreelError::validation("question clip without a question index")
                    })?;
                    composer.question(
                        &req.questions[qi],
                        &req.image_pairs[qi],
                        &question_audio[qi],
                        planned.duration_sec,
                    )?
                }
                ClipRole::Pause => composer.pause(req.clock_audio.as_deref())?,
            };

            let path = out_dir.join(format!("clip_{i:03}.mp4"));
            encode_clip(&spec, v.width, v.height, v.fps, &path)?;
            clip_paths.push(path);
        }

        Ok(clip_paths)
    }
}

fn encode_clip(
    spec: &ClipSpec,
    width: u32,
    height: u32,
    fps: u32,
    out_path: &Path,
) -> QuizreelResult<()> {
    let audio = match &spec.audio {
        Some(path) => ClipAudio::File(path.clone()),
        None => ClipAudio::Silence,
    };
    let cfg = default_mp4_config(out_path, width, height, fps);
    let mut encoder = FfmpegEncoder::new(cfg, &audio, spec.duration_sec)?;
    render_clip(spec, width, height, fps, |frame| encoder.encode_frame(frame))?;
    encoder.finish()
}
