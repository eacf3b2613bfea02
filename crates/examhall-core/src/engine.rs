//! Central exam engine orchestrator.
//!
//! Coordinates exam authoring, teacher accounts, the student roster, and the
//! timed session lifecycle (start, submit, results) over a storage backend.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bank::QuestionBank;
use crate::error::ExamError;
use crate::grade::{grade, ResultRecord};
use crate::model::{
    api_token, hash_password, Exam, ExamStatus, Question, Student, Teacher, TeacherStatus,
};
use crate::session::Session;
use crate::stats::{
    compute_exam_stats, compute_scoreboard, score_rows, ExamStatsSummary, Scoreboard,
};
use crate::store::ExamStore;

/// Overview row for exam listings, decorated with the owning teacher's
/// subject and the current question count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamOverview {
    /// The exam's id.
    pub id: String,
    /// The exam's title.
    pub title: String,
    /// Session time limit in minutes.
    pub duration_minutes: u32,
    /// Lifecycle state.
    pub status: ExamStatus,
    /// Subject of the owning teacher, if any.
    pub subject: Option<String>,
    /// Grouping tag, if any.
    pub tag: Option<String>,
    /// Number of questions currently authored.
    pub question_count: usize,
}

/// Outcome of a roster registration.
#[derive(Debug, Clone)]
pub enum Enrollment {
    /// The student was added to the roster.
    Added(Student),
    /// A matching name was already registered (case-insensitive).
    AlreadyRegistered(Student),
}

/// The central exam engine.
pub struct ExamEngine<S> {
    store: S,
}

impl<S: ExamStore> ExamEngine<S> {
    /// Create an engine over a storage backend.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // -- teachers -----------------------------------------------------------

    /// Register a new teacher, pending approval.
    pub fn register_teacher(
        &self,
        name: &str,
        password: &str,
        subject: Option<String>,
    ) -> Result<Teacher, ExamError> {
        if self.store.get_teacher_by_name(name)?.is_some() {
            return Err(ExamError::TeacherExists(name.to_string()));
        }
        let teacher = Teacher::new(name, password, subject);
        self.store.insert_teacher(&teacher)?;
        tracing::info!("registered teacher '{}' (pending approval)", teacher.name);
        Ok(teacher)
    }

    /// Approve a pending teacher, issuing their API token.
    pub fn approve_teacher(&self, teacher_id: &str) -> Result<Teacher, ExamError> {
        let mut teacher = self
            .store
            .get_teacher(teacher_id)?
            .ok_or_else(|| ExamError::TeacherNotFound(teacher_id.to_string()))?;
        if teacher.status == TeacherStatus::Approved {
            return Err(ExamError::AlreadyApproved(teacher_id.to_string()));
        }
        teacher.status = TeacherStatus::Approved;
        teacher.token = Some(api_token());
        self.store.update_teacher(&teacher)?;
        tracing::info!("approved teacher '{}'", teacher.name);
        Ok(teacher)
    }

    /// Look up a teacher by name/password. Pending teachers cannot log in.
    pub fn login_teacher(&self, name: &str, password: &str) -> Result<Teacher, ExamError> {
        let teacher = self
            .store
            .get_teacher_by_name(name)?
            .filter(|t| t.password_hash == hash_password(password))
            .ok_or(ExamError::InvalidCredentials)?;
        if teacher.status != TeacherStatus::Approved {
            return Err(ExamError::TeacherNotApproved(teacher.name));
        }
        Ok(teacher)
    }

    /// Teachers awaiting approval.
    pub fn pending_teachers(&self) -> Result<Vec<Teacher>, ExamError> {
        Ok(self.store.pending_teachers()?)
    }

    /// Resolve an API token to an approved teacher.
    pub fn authenticate_teacher(&self, token: &str) -> Result<Teacher, ExamError> {
        let teacher = self
            .store
            .get_teacher_by_token(token)?
            .ok_or(ExamError::InvalidCredentials)?;
        if teacher.status != TeacherStatus::Approved {
            return Err(ExamError::TeacherNotApproved(teacher.name));
        }
        Ok(teacher)
    }

    /// Resolve an optional token, treating `None` as anonymous.
    fn maybe_teacher(&self, token: Option<&str>) -> Result<Option<Teacher>, ExamError> {
        token.map(|t| self.authenticate_teacher(t)).transpose()
    }

    // -- exams --------------------------------------------------------------

    /// Create a draft exam, optionally owned by a teacher.
    pub fn create_exam(
        &self,
        title: &str,
        duration_minutes: u32,
        tag: Option<String>,
        teacher_token: Option<&str>,
    ) -> Result<Exam, ExamError> {
        let teacher = self.maybe_teacher(teacher_token)?;
        let mut exam = Exam::new(title, duration_minutes);
        exam.teacher_id = teacher.map(|t| t.id);
        exam.tag = tag;
        self.store.insert_exam(&exam)?;
        tracing::info!("created exam {} '{}'", exam.id, exam.title);
        Ok(exam)
    }

    fn exam_or_err(&self, exam_id: &str) -> Result<Exam, ExamError> {
        self.store
            .get_exam(exam_id)?
            .ok_or_else(|| ExamError::ExamNotFound(exam_id.to_string()))
    }

    /// Fail unless the exam is unowned or owned by the token's teacher.
    fn check_ownership(&self, exam: &Exam, teacher_token: Option<&str>) -> Result<(), ExamError> {
        let Some(owner) = &exam.teacher_id else {
            return Ok(());
        };
        let Some(token) = teacher_token else {
            return Err(ExamError::TeacherAuthRequired);
        };
        let teacher = self.authenticate_teacher(token)?;
        if &teacher.id != owner {
            return Err(ExamError::NotExamOwner(exam.id.clone()));
        }
        Ok(())
    }

    /// Open an exam for sessions.
    pub fn open_exam(&self, exam_id: &str) -> Result<Exam, ExamError> {
        self.set_exam_status(exam_id, ExamStatus::Open)
    }

    /// Close an exam; no new sessions may start.
    pub fn close_exam(&self, exam_id: &str) -> Result<Exam, ExamError> {
        self.set_exam_status(exam_id, ExamStatus::Closed)
    }

    fn set_exam_status(&self, exam_id: &str, status: ExamStatus) -> Result<Exam, ExamError> {
        let mut exam = self.exam_or_err(exam_id)?;
        self.store.set_exam_status(exam_id, status)?;
        exam.status = status;
        tracing::info!("exam {} is now {}", exam.id, status);
        Ok(exam)
    }

    /// List all exams with subject and question count decoration.
    pub fn list_exams(&self) -> Result<Vec<ExamOverview>, ExamError> {
        let exams = self.store.list_exams()?;
        let mut overviews = Vec::with_capacity(exams.len());
        for exam in exams {
            let subject = match &exam.teacher_id {
                Some(id) => self.store.get_teacher(id)?.and_then(|t| t.subject),
                None => None,
            };
            let question_count = self.store.questions_for_exam(&exam.id)?.len();
            overviews.push(ExamOverview {
                id: exam.id,
                title: exam.title,
                duration_minutes: exam.duration_minutes,
                status: exam.status,
                subject,
                tag: exam.tag,
                question_count,
            });
        }
        Ok(overviews)
    }

    // -- questions ----------------------------------------------------------

    /// Add a question to an exam, enforcing ownership and basic validity.
    pub fn add_question(
        &self,
        exam_id: &str,
        prompt: &str,
        choices: Vec<String>,
        answer_index: usize,
        teacher_token: Option<&str>,
    ) -> Result<Question, ExamError> {
        if choices.len() < 2 {
            return Err(ExamError::InvalidQuestion(format!(
                "need at least 2 choices, got {}",
                choices.len()
            )));
        }
        if answer_index >= choices.len() {
            return Err(ExamError::InvalidQuestion(format!(
                "answer_index {} out of range for {} choices",
                answer_index,
                choices.len()
            )));
        }
        if prompt.trim().is_empty() {
            return Err(ExamError::InvalidQuestion("prompt is empty".into()));
        }

        let exam = self.exam_or_err(exam_id)?;
        self.check_ownership(&exam, teacher_token)?;

        let question = Question::new(exam_id, prompt, choices, answer_index);
        self.store.insert_question(&question)?;
        Ok(question)
    }

    /// Questions for an exam, in authored order.
    pub fn list_questions(&self, exam_id: &str) -> Result<Vec<Question>, ExamError> {
        self.exam_or_err(exam_id)?;
        Ok(self.store.questions_for_exam(exam_id)?)
    }

    /// Create a new exam from a bank's header and insert its questions.
    /// Returns the exam and how many questions were inserted.
    pub fn import_bank(
        &self,
        bank: QuestionBank,
        teacher_token: Option<&str>,
    ) -> Result<(Exam, usize), ExamError> {
        let title = bank.title.clone();
        let exam =
            self.create_exam(&title, bank.duration_minutes, bank.tag.clone(), teacher_token)?;
        let inserted = self.insert_bank_questions(&exam.id, bank)?;
        Ok((exam, inserted))
    }

    /// Insert a bank's questions into an existing exam. With `overwrite`,
    /// the exam's current questions are deleted first.
    pub fn load_bank_into(
        &self,
        exam_id: &str,
        bank: QuestionBank,
        overwrite: bool,
        teacher_token: Option<&str>,
    ) -> Result<usize, ExamError> {
        let exam = self.exam_or_err(exam_id)?;
        self.check_ownership(&exam, teacher_token)?;
        if overwrite {
            let removed = self.store.delete_questions(exam_id)?;
            tracing::info!("removed {removed} existing question(s) from exam {exam_id}");
        }
        self.insert_bank_questions(exam_id, bank)
    }

    fn insert_bank_questions(
        &self,
        exam_id: &str,
        bank: QuestionBank,
    ) -> Result<usize, ExamError> {
        let mut inserted = 0;
        for question in bank.into_questions(exam_id) {
            if question.choices.len() < 2 {
                tracing::warn!(
                    "skipping question '{}': fewer than 2 choices",
                    question.id
                );
                continue;
            }
            self.store.insert_question(&question)?;
            inserted += 1;
        }
        tracing::info!("loaded {inserted} question(s) into exam {exam_id}");
        Ok(inserted)
    }

    // -- students -----------------------------------------------------------

    /// Register a student on an exam's roster, deduplicating by
    /// case-insensitive name.
    pub fn register_student(&self, exam_id: &str, name: &str) -> Result<Enrollment, ExamError> {
        self.exam_or_err(exam_id)?;
        if let Some(existing) = self.store.find_student(exam_id, name)? {
            return Ok(Enrollment::AlreadyRegistered(existing));
        }
        let student = Student::new(exam_id, name.trim());
        self.store.insert_student(&student)?;
        Ok(Enrollment::Added(student))
    }

    /// Roster for an exam, ordered by name.
    pub fn list_students(&self, exam_id: &str) -> Result<Vec<Student>, ExamError> {
        self.exam_or_err(exam_id)?;
        Ok(self.store.students_for_exam(exam_id)?)
    }

    // -- sessions -----------------------------------------------------------

    /// Start a session against an open exam at `now`.
    pub fn start_session(
        &self,
        exam_id: &str,
        student_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Session, ExamError> {
        self.start_session_with_rng(exam_id, student_name, now, &mut rand::thread_rng())
    }

    /// Start a session with an explicit RNG (deterministic in tests).
    pub fn start_session_with_rng<R: Rng>(
        &self,
        exam_id: &str,
        student_name: Option<String>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Session, ExamError> {
        let exam = self.exam_or_err(exam_id)?;
        if exam.status != ExamStatus::Open {
            return Err(ExamError::ExamNotOpen(exam_id.to_string()));
        }
        let questions = self.store.questions_for_exam(exam_id)?;
        if questions.is_empty() {
            return Err(ExamError::NoQuestions(exam_id.to_string()));
        }

        let session = Session::start(&exam, &questions, student_name, now, rng);
        self.store.insert_session(&session)?;
        tracing::info!(
            "started session {} for exam {} ({} questions, deadline {})",
            session.token,
            exam_id,
            session.questions.len(),
            session.deadline
        );
        Ok(session)
    }

    /// Fetch a session by token.
    pub fn session(&self, token: &str) -> Result<Session, ExamError> {
        self.store
            .get_session(token)?
            .ok_or_else(|| ExamError::SessionNotFound(token.to_string()))
    }

    /// Grade and record a submission at `now`, enforcing the deadline.
    ///
    /// Replaces any previous result for the token — the last submission wins.
    pub fn submit(
        &self,
        token: &str,
        student_name: Option<String>,
        answers: HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> Result<ResultRecord, ExamError> {
        let session = self.session(token)?;
        if session.is_expired(now) {
            return Err(ExamError::SessionExpired {
                token: token.to_string(),
                overrun_secs: (now - session.deadline).num_seconds(),
            });
        }

        let graded = grade(&session.questions, &answers);
        let name = effective_student_name(student_name, &session);
        let record = ResultRecord::from_graded(
            token,
            session.exam_id.clone(),
            name,
            answers,
            graded,
            now,
        );
        self.store.replace_result(&record)?;
        tracing::info!(
            "recorded result for session {}: {}/{}",
            token,
            record.score,
            record.total
        );
        Ok(record)
    }

    // -- results ------------------------------------------------------------

    /// Recorded result for a session token.
    pub fn result(&self, token: &str) -> Result<ResultRecord, ExamError> {
        self.store
            .get_result(token)?
            .ok_or_else(|| ExamError::ResultNotFound(token.to_string()))
    }

    /// All recorded results for an exam, most recent first.
    pub fn exam_results(&self, exam_id: &str) -> Result<Vec<ResultRecord>, ExamError> {
        self.exam_or_err(exam_id)?;
        Ok(self.store.results_for_exam(exam_id)?)
    }

    /// Scoreboard across every exam the token's teacher owns.
    pub fn teacher_scoreboard(&self, teacher_token: &str) -> Result<Scoreboard, ExamError> {
        let teacher = self.authenticate_teacher(teacher_token)?;
        let mut rows = Vec::new();
        for exam in self.store.list_exams()? {
            if exam.teacher_id.as_deref() != Some(teacher.id.as_str()) {
                continue;
            }
            let results = self.store.results_for_exam(&exam.id)?;
            rows.extend(score_rows(&exam, &results));
        }
        Ok(compute_scoreboard(rows))
    }

    /// Summary statistics for one exam.
    pub fn exam_stats(&self, exam_id: &str) -> Result<ExamStatsSummary, ExamError> {
        self.exam_or_err(exam_id)?;
        let results = self.store.results_for_exam(exam_id)?;
        Ok(compute_exam_stats(exam_id, &results))
    }
}

/// A submitted name wins over the name captured at session start; blank
/// submissions fall back to the captured name.
fn effective_student_name(submitted: Option<String>, session: &Session) -> Option<String> {
    submitted
        .filter(|n| !n.trim().is_empty())
        .or_else(|| session.student_name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Exam;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session_named(name: Option<&str>) -> Session {
        let exam = Exam::new("Quiz", 30);
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        Session::start(
            &exam,
            &[],
            name.map(String::from),
            now,
            &mut StdRng::seed_from_u64(1),
        )
    }

    #[test]
    fn submitted_name_wins_over_captured() {
        let session = session_named(Some("Captured"));
        assert_eq!(
            effective_student_name(Some("Submitted".into()), &session).as_deref(),
            Some("Submitted")
        );
    }

    #[test]
    fn blank_submission_falls_back_to_captured_name() {
        let session = session_named(Some("Captured"));
        assert_eq!(
            effective_student_name(Some("   ".into()), &session).as_deref(),
            Some("Captured")
        );
        assert_eq!(
            effective_student_name(None, &session).as_deref(),
            Some("Captured")
        );
        let anonymous = session_named(None);
        assert_eq!(effective_student_name(None, &anonymous), None);
    }
}
