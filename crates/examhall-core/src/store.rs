//! Storage trait for exam data.
//!
//! The engine talks to persistence only through [`ExamStore`]; the
//! `examhall-store` crate provides the SQLite and in-memory backends.

use thiserror::Error;

use crate::grade::ResultRecord;
use crate::model::{Exam, ExamStatus, Question, Student, Teacher};
use crate::session::Session;

/// Errors produced by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The backend itself failed (I/O, SQL, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Persistence operations the engine needs.
///
/// All methods are synchronous single-row or single-scan operations; there is
/// no cross-call transaction surface beyond what each method guarantees.
pub trait ExamStore: Send + Sync {
    // -- exams --------------------------------------------------------------

    /// Insert a new exam.
    fn insert_exam(&self, exam: &Exam) -> Result<(), StoreError>;

    /// Fetch an exam by id.
    fn get_exam(&self, id: &str) -> Result<Option<Exam>, StoreError>;

    /// List all exams.
    fn list_exams(&self) -> Result<Vec<Exam>, StoreError>;

    /// Set an exam's lifecycle status.
    fn set_exam_status(&self, id: &str, status: ExamStatus) -> Result<(), StoreError>;

    // -- questions ----------------------------------------------------------

    /// Insert a new question.
    fn insert_question(&self, question: &Question) -> Result<(), StoreError>;

    /// All questions for an exam, in insertion order.
    fn questions_for_exam(&self, exam_id: &str) -> Result<Vec<Question>, StoreError>;

    /// Delete all questions for an exam; returns how many were removed.
    fn delete_questions(&self, exam_id: &str) -> Result<usize, StoreError>;

    // -- teachers -----------------------------------------------------------

    /// Insert a new teacher.
    fn insert_teacher(&self, teacher: &Teacher) -> Result<(), StoreError>;

    /// Fetch a teacher by id.
    fn get_teacher(&self, id: &str) -> Result<Option<Teacher>, StoreError>;

    /// Fetch a teacher by login name.
    fn get_teacher_by_name(&self, name: &str) -> Result<Option<Teacher>, StoreError>;

    /// Fetch a teacher by API token.
    fn get_teacher_by_token(&self, token: &str) -> Result<Option<Teacher>, StoreError>;

    /// Overwrite a teacher row (approval, token issuance).
    fn update_teacher(&self, teacher: &Teacher) -> Result<(), StoreError>;

    /// Teachers awaiting approval.
    fn pending_teachers(&self) -> Result<Vec<Teacher>, StoreError>;

    // -- students -----------------------------------------------------------

    /// Insert a roster entry.
    fn insert_student(&self, student: &Student) -> Result<(), StoreError>;

    /// Roster for an exam, ordered by name.
    fn students_for_exam(&self, exam_id: &str) -> Result<Vec<Student>, StoreError>;

    /// Case-insensitive roster lookup.
    fn find_student(&self, exam_id: &str, name: &str) -> Result<Option<Student>, StoreError>;

    // -- sessions -----------------------------------------------------------

    /// Persist a started session and its presentation snapshot.
    fn insert_session(&self, session: &Session) -> Result<(), StoreError>;

    /// Fetch a session by token.
    fn get_session(&self, token: &str) -> Result<Option<Session>, StoreError>;

    // -- results ------------------------------------------------------------

    /// Record a result, replacing any previous result for the same token.
    fn replace_result(&self, result: &ResultRecord) -> Result<(), StoreError>;

    /// Fetch the recorded result for a session token.
    fn get_result(&self, token: &str) -> Result<Option<ResultRecord>, StoreError>;

    /// All results for an exam, most recent first.
    fn results_for_exam(&self, exam_id: &str) -> Result<Vec<ResultRecord>, StoreError>;
}
