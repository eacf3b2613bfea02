//! Core data model types for examhall.
//!
//! These are the fundamental types that the entire examhall system uses to
//! represent exams, questions, and the people authoring or taking them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Generate a short 8-character identifier.
///
/// Used for exams, questions, students, results, and session tokens — short
/// enough to read over a shoulder or type into a terminal.
pub fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Generate a 24-character teacher API token.
pub fn api_token() -> String {
    Uuid::new_v4().simple().to_string()[..24].to_string()
}

/// A single exam: a titled, timed collection of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    /// Unique identifier for this exam.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Wall-clock time limit for one session, in minutes.
    pub duration_minutes: u32,
    /// Lifecycle state; sessions may only start while `Open`.
    #[serde(default)]
    pub status: ExamStatus,
    /// Owning teacher, if the exam was created through a teacher token.
    #[serde(default)]
    pub teacher_id: Option<String>,
    /// Free-form grouping label (e.g. "2026-spring").
    #[serde(default)]
    pub tag: Option<String>,
}

impl Exam {
    /// Create a new draft exam with a fresh id.
    pub fn new(title: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            id: short_id(),
            title: title.into(),
            duration_minutes,
            status: ExamStatus::Draft,
            teacher_id: None,
            tag: None,
        }
    }
}

/// Lifecycle state of an exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExamStatus {
    /// Being authored; not yet visible to students.
    #[default]
    Draft,
    /// Accepting new sessions.
    Open,
    /// Finished; no new sessions may start.
    Closed,
}

impl fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamStatus::Draft => write!(f, "draft"),
            ExamStatus::Open => write!(f, "open"),
            ExamStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for ExamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ExamStatus::Draft),
            "open" => Ok(ExamStatus::Open),
            "closed" => Ok(ExamStatus::Closed),
            other => Err(format!("unknown exam status: {other}")),
        }
    }
}

/// A multiple-choice question in its authored form.
///
/// `answer_index` refers to the authored choice order; the per-session
/// presentation re-maps it after shuffling (see [`crate::session`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier for this question.
    pub id: String,
    /// The exam this question belongs to.
    pub exam_id: String,
    /// Question text shown to the student.
    pub prompt: String,
    /// Choices in authored order.
    pub choices: Vec<String>,
    /// Index of the correct choice in authored order.
    pub answer_index: usize,
}

impl Question {
    /// Create a new question with a fresh id.
    pub fn new(
        exam_id: impl Into<String>,
        prompt: impl Into<String>,
        choices: Vec<String>,
        answer_index: usize,
    ) -> Self {
        Self {
            id: short_id(),
            exam_id: exam_id.into(),
            prompt: prompt.into(),
            choices,
            answer_index,
        }
    }
}

/// A teacher account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique identifier for this teacher.
    pub id: String,
    /// Login name (unique).
    pub name: String,
    /// SHA-256 hex digest of the password.
    pub password_hash: String,
    /// Subject taught, used to group exams in listings.
    #[serde(default)]
    pub subject: Option<String>,
    /// Approval state; only approved teachers hold an API token.
    #[serde(default)]
    pub status: TeacherStatus,
    /// API token, issued on approval.
    #[serde(default)]
    pub token: Option<String>,
}

impl Teacher {
    /// Create a pending teacher with a hashed password and no token.
    pub fn new(name: impl Into<String>, password: &str, subject: Option<String>) -> Self {
        Self {
            id: short_id(),
            name: name.into(),
            password_hash: hash_password(password),
            subject,
            status: TeacherStatus::Pending,
            token: None,
        }
    }
}

/// Approval state of a teacher account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TeacherStatus {
    /// Registered, awaiting administrator approval.
    #[default]
    Pending,
    /// Approved; holds an API token and may own exams.
    Approved,
}

impl fmt::Display for TeacherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeacherStatus::Pending => write!(f, "pending"),
            TeacherStatus::Approved => write!(f, "approved"),
        }
    }
}

impl FromStr for TeacherStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TeacherStatus::Pending),
            "approved" => Ok(TeacherStatus::Approved),
            other => Err(format!("unknown teacher status: {other}")),
        }
    }
}

/// SHA-256 hex digest of a password.
pub fn hash_password(password: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A roster entry: one student registered for one exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier for this roster entry.
    pub id: String,
    /// The exam this student is registered for.
    pub exam_id: String,
    /// Student name as registered.
    pub name: String,
}

impl Student {
    /// Create a new roster entry with a fresh id.
    pub fn new(exam_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: short_id(),
            exam_id: exam_id.into(),
            name: name.into(),
        }
    }
}
