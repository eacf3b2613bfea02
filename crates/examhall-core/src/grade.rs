//! Score computation against a session's presentation snapshot.
//!
//! Grading never touches the live question rows: the snapshot's
//! `correct_index` is the only answer key, so a student is scored against
//! exactly what they were shown.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::short_id;
use crate::session::PresentedQuestion;

/// Parse a raw answer selection into a choice index.
///
/// Accepts numeric strings (`"2"`) and letter labels (`"C"` / `"c"`).
/// Anything else is treated as unanswered.
pub fn parse_selection(raw: &str) -> Option<usize> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse().ok();
    }
    let first = s.chars().next()?;
    if first.is_ascii_alphabetic() {
        let upper = first.to_ascii_uppercase();
        return Some((upper as u8 - b'A') as usize);
    }
    None
}

/// Letter label (A, B, C, ...) for a choice index, for indexes below 26.
pub fn choice_label(index: usize) -> Option<char> {
    if index < 26 {
        Some((b'A' + index as u8) as char)
    } else {
        None
    }
}

/// Per-question grading detail, kept for later review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerDetail {
    /// Id of the authored question.
    pub question_id: String,
    /// Question text as presented.
    pub prompt: String,
    /// Choices in presentation order.
    pub choices: Vec<String>,
    /// Selected choice index, if the answer parsed.
    pub selected_index: Option<usize>,
    /// Letter label for the selection.
    pub selected_label: Option<char>,
    /// Text of the selected choice, if in range.
    pub selected_text: Option<String>,
    /// Correct choice index in presentation order.
    pub correct_index: usize,
    /// Letter label for the correct choice.
    pub correct_label: Option<char>,
    /// Text of the correct choice.
    pub correct_text: Option<String>,
    /// Whether the selection matched the key.
    pub is_correct: bool,
}

/// A graded submission: the score plus per-question details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedSubmission {
    /// Number of correctly answered questions.
    pub score: u32,
    /// Number of questions presented.
    pub total: u32,
    /// Per-question breakdown.
    pub details: Vec<AnswerDetail>,
}

/// Grade raw answers against the presentation snapshot.
///
/// One point per question whose selected index equals the snapshot's
/// `correct_index`. Unparseable or missing answers count as unanswered;
/// selections outside the choice list score zero and carry no selected text.
pub fn grade(
    questions: &[PresentedQuestion],
    answers: &HashMap<String, String>,
) -> GradedSubmission {
    let mut score = 0u32;
    let mut details = Vec::with_capacity(questions.len());

    for q in questions {
        let selected_index = answers
            .get(&q.question_id)
            .and_then(|raw| parse_selection(raw));
        let selected_text = selected_index
            .and_then(|i| q.choices.get(i))
            .cloned();
        let correct_text = q.choices.get(q.correct_index).cloned();
        let is_correct = selected_index == Some(q.correct_index);
        if is_correct {
            score += 1;
        }

        details.push(AnswerDetail {
            question_id: q.question_id.clone(),
            prompt: q.prompt.clone(),
            choices: q.choices.clone(),
            selected_index,
            selected_label: selected_index.and_then(choice_label),
            selected_text,
            correct_index: q.correct_index,
            correct_label: choice_label(q.correct_index),
            correct_text,
            is_correct,
        });
    }

    GradedSubmission {
        score,
        total: questions.len() as u32,
        details,
    }
}

/// A recorded submission for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Unique identifier for this result row.
    pub id: String,
    /// Session token this result belongs to.
    pub token: String,
    /// The exam the session was started against.
    pub exam_id: String,
    /// Student name recorded at submission.
    pub student_name: Option<String>,
    /// Number of correct answers.
    pub score: u32,
    /// Number of questions presented.
    pub total: u32,
    /// When the submission arrived.
    pub submitted_at: DateTime<Utc>,
    /// Raw answers as submitted, keyed by question id.
    pub answers: HashMap<String, String>,
    /// Per-question grading detail.
    pub details: Vec<AnswerDetail>,
}

impl ResultRecord {
    /// Build a result row from a graded submission.
    pub fn from_graded(
        token: impl Into<String>,
        exam_id: impl Into<String>,
        student_name: Option<String>,
        answers: HashMap<String, String>,
        graded: GradedSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: short_id(),
            token: token.into(),
            exam_id: exam_id.into(),
            student_name,
            score: graded.score,
            total: graded.total,
            submitted_at,
            answers,
            details: graded.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presented(id: &str, choices: &[&str], correct_index: usize) -> PresentedQuestion {
        PresentedQuestion {
            question_id: id.into(),
            prompt: format!("prompt {id}"),
            choices: choices.iter().map(|c| c.to_string()).collect(),
            correct_index,
        }
    }

    fn snapshot() -> Vec<PresentedQuestion> {
        vec![
            presented("q1", &["red", "green", "blue"], 1),
            presented("q2", &["one", "two"], 0),
            presented("q3", &["yes", "no", "maybe"], 2),
        ]
    }

    #[test]
    fn parse_selection_numeric_and_letters() {
        assert_eq!(parse_selection("0"), Some(0));
        assert_eq!(parse_selection("2"), Some(2));
        assert_eq!(parse_selection("A"), Some(0));
        assert_eq!(parse_selection("c"), Some(2));
        assert_eq!(parse_selection(" B "), Some(1));
        assert_eq!(parse_selection(""), None);
        assert_eq!(parse_selection("  "), None);
        assert_eq!(parse_selection("?!"), None);
    }

    #[test]
    fn choice_labels_stop_after_z() {
        assert_eq!(choice_label(0), Some('A'));
        assert_eq!(choice_label(25), Some('Z'));
        assert_eq!(choice_label(26), None);
    }

    #[test]
    fn grade_counts_index_matches() {
        let answers: HashMap<String, String> = [
            ("q1".to_string(), "B".to_string()),
            ("q2".to_string(), "1".to_string()),
            ("q3".to_string(), "C".to_string()),
        ]
        .into();
        let graded = grade(&snapshot(), &answers);
        // q1 correct (B == index 1), q2 wrong, q3 correct.
        assert_eq!(graded.score, 2);
        assert_eq!(graded.total, 3);
        assert!(graded.details[0].is_correct);
        assert!(!graded.details[1].is_correct);
        assert!(graded.details[2].is_correct);
    }

    #[test]
    fn missing_answers_count_as_unanswered() {
        let answers: HashMap<String, String> = [("q1".to_string(), "B".to_string())].into();
        let graded = grade(&snapshot(), &answers);
        assert_eq!(graded.score, 1);
        assert_eq!(graded.details[1].selected_index, None);
        assert_eq!(graded.details[1].selected_label, None);
        assert!(!graded.details[1].is_correct);
    }

    #[test]
    fn out_of_range_selection_scores_zero_without_text() {
        let answers: HashMap<String, String> = [("q2".to_string(), "9".to_string())].into();
        let graded = grade(&snapshot(), &answers);
        let detail = &graded.details[1];
        assert_eq!(detail.selected_index, Some(9));
        assert_eq!(detail.selected_text, None);
        assert!(!detail.is_correct);
    }

    #[test]
    fn detail_carries_labels_and_texts() {
        let answers: HashMap<String, String> = [("q1".to_string(), "a".to_string())].into();
        let graded = grade(&snapshot(), &answers);
        let detail = &graded.details[0];
        assert_eq!(detail.selected_label, Some('A'));
        assert_eq!(detail.selected_text.as_deref(), Some("red"));
        assert_eq!(detail.correct_label, Some('B'));
        assert_eq!(detail.correct_text.as_deref(), Some("green"));
    }

    #[test]
    fn empty_snapshot_grades_to_zero_of_zero() {
        let graded = grade(&[], &HashMap::new());
        assert_eq!(graded.score, 0);
        assert_eq!(graded.total, 0);
        assert!(graded.details.is_empty());
    }
}
