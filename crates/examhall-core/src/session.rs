//! Per-session presentation state and the timed session lifecycle.
//!
//! When a session starts, the exam's questions are snapshotted into a
//! per-session presentation: question order randomized, each choice list
//! shuffled, and the answer key re-mapped to the shuffled positions. Grading
//! reads only this snapshot, so edits to the live question rows cannot change
//! what a running session sees.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{short_id, Exam, Question};

/// One question as presented to a single session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentedQuestion {
    /// Id of the authored question this entry was built from.
    pub question_id: String,
    /// Question text shown to the student.
    pub prompt: String,
    /// Choices in presentation order.
    pub choices: Vec<String>,
    /// Index of the correct choice in presentation order.
    pub correct_index: usize,
}

/// Build the per-session presentation: randomize question order, shuffle each
/// choice list, and re-map the answer key by value.
///
/// The presented correct index is the first position in the shuffled list
/// whose value equals the authored correct choice, so duplicate choice values
/// re-map to the earliest match. An out-of-range authored `answer_index`
/// falls back to presented index 0 to keep the snapshot total; bank
/// validation flags such questions upstream.
pub fn build_presentation<R: Rng>(questions: &[Question], rng: &mut R) -> Vec<PresentedQuestion> {
    let mut order: Vec<&Question> = questions.iter().collect();
    order.shuffle(rng);

    order
        .into_iter()
        .map(|q| {
            let mut choices = q.choices.clone();
            choices.shuffle(rng);

            let correct_index = q
                .choices
                .get(q.answer_index)
                .and_then(|value| choices.iter().position(|c| c == value))
                .unwrap_or(0);

            PresentedQuestion {
                question_id: q.id.clone(),
                prompt: q.prompt.clone(),
                choices,
                correct_index,
            }
        })
        .collect()
}

/// A started exam session: the presentation snapshot plus its deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Short token identifying this session.
    pub token: String,
    /// The exam this session was started against.
    pub exam_id: String,
    /// Student name captured at start, if given.
    pub student_name: Option<String>,
    /// Tag copied from the exam at start time.
    pub tag: Option<String>,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// Hard wall-clock deadline; submissions after this instant are rejected.
    pub deadline: DateTime<Utc>,
    /// The per-session presentation snapshot.
    pub questions: Vec<PresentedQuestion>,
}

impl Session {
    /// Snapshot `questions` for `exam`, starting the clock at `now`.
    pub fn start<R: Rng>(
        exam: &Exam,
        questions: &[Question],
        student_name: Option<String>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        Self {
            token: short_id(),
            exam_id: exam.id.clone(),
            student_name,
            tag: exam.tag.clone(),
            started_at: now,
            deadline: now + Duration::minutes(i64::from(exam.duration_minutes)),
            questions: build_presentation(questions, rng),
        }
    }

    /// Seconds left before the deadline, clamped at zero.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_seconds().max(0)
    }

    /// Whether the deadline has passed. A submission exactly at the deadline
    /// is still accepted.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }
}
