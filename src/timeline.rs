use crate::{
    config::TimingSettings,
    error::{QuizreelError, QuizreelResult},
    model::ClipRole,
};

/// One scheduled clip: its role, final duration, and (for questions) the
/// index into the question list.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedClip {
    pub role: ClipRole,
    pub duration_sec: f64,
    pub question_index: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct TimelinePlan {
    pub clips: Vec<PlannedClip>,
}

impl TimelinePlan {
    pub fn total_duration_sec(&self) -> f64 {
        self.clips.iter().map(|c| c.duration_sec).sum()
    }
}

/// Fail if the question and image-pair counts disagree. Runs before any
/// narration is synthesized so a bad run costs no API calls.
pub fn validate_counts(questions: usize, image_pairs: usize) -> QuizreelResult<()> {
    if questions != image_pairs {
        return Err(QuizreelError::validation(format!(
            "number of questions ({questions}) must match number of image pairs ({image_pairs})"
        )));
    }
    if questions == 0 {
        return Err(QuizreelError::validation("at least one question is required"));
    }
    Ok(())
}

/// Schedule the fixed clip order from already-known narration durations:
/// intro, hook, share, then questions in input order. Each question runs for
/// its narration length plus the configured pad. `legacy_pauses` restores the
/// older pipeline's pause clip between consecutive questions.
pub fn plan_timeline(
    hook_sec: f64,
    question_secs: &[f64],
    timing: &TimingSettings,
    legacy_pauses: bool,
) -> QuizreelResult<TimelinePlan> {
    if question_secs.is_empty() {
        return Err(QuizreelError::validation("cannot plan an empty timeline"));
    }
    for (i, &sec) in question_secs.iter().enumerate() {
        if !sec.is_finite() || sec <= 0.0 {
            return Err(QuizreelError::validation(format!(
                "question {} narration duration must be > 0 (got {sec})",
                i + 1
            )));
        }
    }
    if !hook_sec.is_finite() || hook_sec <= 0.0 {
        return Err(QuizreelError::validation(format!(
            "hook narration duration must be > 0 (got {hook_sec})"
        )));
    }

    let mut clips = Vec::with_capacity(3 + question_secs.len() * 2);
    clips.push(PlannedClip {
        role: ClipRole::Intro,
        duration_sec: timing.intro_duration_sec,
        question_index: None,
    });
    clips.push(PlannedClip {
        role: ClipRole::Hook,
        duration_sec: hook_sec,
        question_index: None,
    });
    clips.push(PlannedClip {
        role: ClipRole::Share,
        duration_sec: timing.share_duration_sec,
        question_index: None,
    });

    for (i, &narration_sec) in question_secs.iter().enumerate() {
        clips.push(PlannedClip {
            role: ClipRole::Question,
            duration_sec: narration_sec + timing.question_pad_sec,
            question_index: Some(i),
        });
        if legacy_pauses && i + 1 < question_secs.len() {
            clips.push(PlannedClip {
                role: ClipRole::Pause,
                duration_sec: timing.pause_duration_sec,
                question_index: None,
            });
        }
    }

    Ok(TimelinePlan { clips })
}
