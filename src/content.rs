use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::error::{QuizreelError, QuizreelResult};

/// Top/bottom comparison images shown with one question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePair {
    pub top: PathBuf,
    pub bottom: PathBuf,
}

/// Load a JSON array of question strings.
pub fn load_questions(path: &Path) -> QuizreelResult<Vec<String>> {
    load_string_array(path, "questions")
}

/// Load a JSON array of hook strings.
pub fn load_hooks(path: &Path) -> QuizreelResult<Vec<String>> {
    load_string_array(path, "hooks")
}

fn load_string_array(path: &Path, what: &str) -> QuizreelResult<Vec<String>> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    let items: Vec<String> = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
        QuizreelError::config(format!(
            "invalid {what} JSON in '{}': {e}",
            path.display()
        ))
    })?;
    Ok(items)
}

/// Chunk a flat image list into top/bottom pairs, one pair per question.
///
/// The count check runs before any narration is synthesized, so a bad image
/// selection never costs an API call.
pub fn pair_images(questions: &[String], images: &[PathBuf]) -> QuizreelResult<Vec<ImagePair>> {
    if images.len() != questions.len() * 2 {
        return Err(QuizreelError::validation(format!(
            "got {} images for {} questions; expected {} (2 per question)",
            images.len(),
            questions.len(),
            questions.len() * 2
        )));
    }

    Ok(images
        .chunks_exact(2)
        .map(|pair| ImagePair {
            top: pair[0].clone(),
            bottom: pair[1].clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn pairs_two_images_per_question_in_order() {
        let questions = vec!["q1".to_string(), "q2".to_string()];
        let pairs = pair_images(&questions, &paths(&["a", "b", "c", "d"])).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].top, PathBuf::from("a"));
        assert_eq!(pairs[0].bottom, PathBuf::from("b"));
        assert_eq!(pairs[1].top, PathBuf::from("c"));
        assert_eq!(pairs[1].bottom, PathBuf::from("d"));
    }

    #[test]
    fn mismatched_image_count_is_rejected() {
        let questions = vec!["q1".to_string(), "q2".to_string()];
        assert!(pair_images(&questions, &paths(&["a", "b", "c"])).is_err());
        assert!(pair_images(&questions, &paths(&["a", "b"])).is_err());
    }

    #[test]
    fn loads_question_array_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(&path, r#"["coffee or tea?", "cats or dogs?"]"#).unwrap();
        let questions = load_questions(&path).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0], "coffee or tea?");
    }

    #[test]
    fn rejects_non_array_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hooks.json");
        std::fs::write(&path, r#"{"hook": "nope"}"#).unwrap();
        assert!(load_hooks(&path).is_err());
    }
}
