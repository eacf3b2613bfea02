//! Engine error types.
//!
//! These errors classify everything that can go wrong in the exam lifecycle
//! so callers can map them to user messages or exit codes without string
//! matching.

use thiserror::Error;

use crate::store::StoreError;

/// Errors produced by the exam engine.
#[derive(Debug, Error)]
pub enum ExamError {
    /// No exam with the given id.
    #[error("exam not found: {0}")]
    ExamNotFound(String),

    /// The exam exists but is not accepting sessions.
    #[error("exam {0} is not open")]
    ExamNotOpen(String),

    /// The exam has no questions to present.
    #[error("exam {0} has no questions")]
    NoQuestions(String),

    /// A question failed validation on insert.
    #[error("invalid question: {0}")]
    InvalidQuestion(String),

    /// No session with the given token.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The session deadline passed before submission.
    #[error("session {token} expired {overrun_secs}s before submission")]
    SessionExpired {
        /// The expired session's token.
        token: String,
        /// How late the submission arrived, in seconds.
        overrun_secs: i64,
    },

    /// The operation requires a teacher token and none was given.
    #[error("teacher authentication required")]
    TeacherAuthRequired,

    /// The token or name/password pair did not match a teacher.
    #[error("invalid teacher credentials")]
    InvalidCredentials,

    /// The teacher exists but has not been approved yet.
    #[error("teacher '{0}' is pending approval")]
    TeacherNotApproved(String),

    /// A teacher with this name already exists.
    #[error("teacher '{0}' already registered")]
    TeacherExists(String),

    /// No teacher with the given id.
    #[error("teacher not found: {0}")]
    TeacherNotFound(String),

    /// Approval requested for an already-approved teacher.
    #[error("teacher {0} already approved")]
    AlreadyApproved(String),

    /// The authenticated teacher does not own the exam.
    #[error("not the owner of exam {0}")]
    NotExamOwner(String),

    /// No recorded result for the given session token.
    #[error("no result recorded for token: {0}")]
    ResultNotFound(String),

    /// The storage backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ExamError {
    /// Returns `true` if this error reflects bad input or state rather than
    /// a storage failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ExamError::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_client_errors() {
        assert!(ExamError::ExamNotFound("x".into()).is_client_error());
        assert!(ExamError::SessionExpired {
            token: "t".into(),
            overrun_secs: 5
        }
        .is_client_error());
        assert!(!ExamError::Store(StoreError::Backend("io".into())).is_client_error());
    }

    #[test]
    fn expired_message_includes_overrun() {
        let err = ExamError::SessionExpired {
            token: "ab12cd34".into(),
            overrun_secs: 42,
        };
        assert_eq!(
            err.to_string(),
            "session ab12cd34 expired 42s before submission"
        );
    }
}
