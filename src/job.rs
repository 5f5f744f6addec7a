use std::{
    path::PathBuf,
    sync::mpsc::{Receiver, channel},
    thread::JoinHandle,
};

use crate::{
    error::{QuizreelError, QuizreelResult},
    pipeline::{Generator, RenderRequest},
};

/// Progress and completion events from a background render.
#[derive(Debug)]
pub enum JobEvent {
    Progress(String),
    Done(QuizreelResult<PathBuf>),
}

/// A render running on its own thread. Callers drain [`JobEvent`]s from the
/// channel while the pipeline works, so a front end stays responsive.
pub struct RenderJob {
    events: Receiver<JobEvent>,
    handle: JoinHandle<()>,
}

impl RenderJob {
    pub fn spawn(generator: Generator, request: RenderRequest) -> Self {
        let (tx, events) = channel();
        let handle = std::thread::spawn(move || {
            let progress_tx = tx.clone();
            let result = generator.generate_with_progress(&request, &mut |msg| {
                let _ = progress_tx.send(JobEvent::Progress(msg.to_string()));
            });
            let _ = tx.send(JobEvent::Done(result));
        });
        Self { events, handle }
    }

    pub fn events(&self) -> &Receiver<JobEvent> {
        &self.events
    }

    /// Block until the render finishes, forwarding progress lines to `on_progress`.
    pub fn wait(self, mut on_progress: impl FnMut(&str)) -> QuizreelResult<PathBuf> {
        let mut outcome = None;
        for event in self.events.iter() {
            match event {
                JobEvent::Progress(msg) => on_progress(&msg),
                JobEvent::Done(result) => {
                    outcome = Some(result);
                    break;
                }
            }
        }
        self.handle
            .join()
            .map_err(|_| QuizreelError::encode("render thread panicked"))?;
        outcome.ok_or_else(|| QuizreelError::encode("render thread exited without a result"))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, content::ImagePair, tts::SpeechSynthesizer};
    use std::path::Path;

    struct NoopSynth;

    impl SpeechSynthesizer for NoopSynth {
        fn synthesize(&self, _text: &str, _out: &Path) -> QuizreelResult<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_render_reports_done_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg: Config = serde_json::from_value(serde_json::json!({
            "video_settings": {
                "width": 1080,
                "height": 1920,
                "fps": 30,
                "text_font_size": 80,
                "font_path": "fonts/Renogare-Regular.ttf"
            },
            "voice_settings": { "voice_id": "v", "api_key": "k" },
            "output_settings": {
                "output_dir": dir.path(),
                "output_filename": "quiz.mp4"
            }
        }))
        .unwrap();

        // One question but zero image pairs: validation fails on the worker
        // thread and surfaces through the Done event.
        let request = RenderRequest {
            theme: "General".into(),
            hook: "Let's play!".into(),
            questions: vec!["q1".into()],
            image_pairs: Vec::<ImagePair>::new(),
            clock_audio: None,
            legacy_pauses: false,
            output_path: None,
        };

        let job = RenderJob::spawn(Generator::new(cfg, Box::new(NoopSynth)), request);
        let result = job.wait(|_| {});
        assert!(matches!(result, Err(QuizreelError::Validation(_))));
    }
}
