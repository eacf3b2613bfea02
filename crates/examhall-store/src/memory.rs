//! In-memory exam store for tests.
//!
//! Trait-complete but not durable; engine tests use it to exercise full
//! lifecycles without touching disk.

use std::sync::Mutex;

use examhall_core::grade::ResultRecord;
use examhall_core::model::{Exam, ExamStatus, Question, Student, Teacher, TeacherStatus};
use examhall_core::session::Session;
use examhall_core::store::{ExamStore, StoreError};

#[derive(Default)]
struct Inner {
    exams: Vec<Exam>,
    questions: Vec<Question>,
    teachers: Vec<Teacher>,
    students: Vec<Student>,
    sessions: Vec<Session>,
    results: Vec<ResultRecord>,
}

/// A mutex-guarded in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".into()))
    }
}

impl ExamStore for MemoryStore {
    fn insert_exam(&self, exam: &Exam) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.exams.iter().any(|e| e.id == exam.id) {
            return Err(StoreError::Conflict(format!("exam {}", exam.id)));
        }
        inner.exams.push(exam.clone());
        Ok(())
    }

    fn get_exam(&self, id: &str) -> Result<Option<Exam>, StoreError> {
        Ok(self.lock()?.exams.iter().find(|e| e.id == id).cloned())
    }

    fn list_exams(&self) -> Result<Vec<Exam>, StoreError> {
        Ok(self.lock()?.exams.clone())
    }

    fn set_exam_status(&self, id: &str, status: ExamStatus) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let exam = inner
            .exams
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("exam {id}")))?;
        exam.status = status;
        Ok(())
    }

    fn insert_question(&self, question: &Question) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.questions.iter().any(|q| q.id == question.id) {
            return Err(StoreError::Conflict(format!("question {}", question.id)));
        }
        inner.questions.push(question.clone());
        Ok(())
    }

    fn questions_for_exam(&self, exam_id: &str) -> Result<Vec<Question>, StoreError> {
        Ok(self
            .lock()?
            .questions
            .iter()
            .filter(|q| q.exam_id == exam_id)
            .cloned()
            .collect())
    }

    fn delete_questions(&self, exam_id: &str) -> Result<usize, StoreError> {
        let mut inner = self.lock()?;
        let before = inner.questions.len();
        inner.questions.retain(|q| q.exam_id != exam_id);
        Ok(before - inner.questions.len())
    }

    fn insert_teacher(&self, teacher: &Teacher) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.teachers.iter().any(|t| t.name == teacher.name) {
            return Err(StoreError::Conflict(format!("teacher '{}'", teacher.name)));
        }
        inner.teachers.push(teacher.clone());
        Ok(())
    }

    fn get_teacher(&self, id: &str) -> Result<Option<Teacher>, StoreError> {
        Ok(self.lock()?.teachers.iter().find(|t| t.id == id).cloned())
    }

    fn get_teacher_by_name(&self, name: &str) -> Result<Option<Teacher>, StoreError> {
        Ok(self
            .lock()?
            .teachers
            .iter()
            .find(|t| t.name == name)
            .cloned())
    }

    fn get_teacher_by_token(&self, token: &str) -> Result<Option<Teacher>, StoreError> {
        Ok(self
            .lock()?
            .teachers
            .iter()
            .find(|t| t.token.as_deref() == Some(token))
            .cloned())
    }

    fn update_teacher(&self, teacher: &Teacher) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let slot = inner
            .teachers
            .iter_mut()
            .find(|t| t.id == teacher.id)
            .ok_or_else(|| StoreError::NotFound(format!("teacher {}", teacher.id)))?;
        *slot = teacher.clone();
        Ok(())
    }

    fn pending_teachers(&self) -> Result<Vec<Teacher>, StoreError> {
        let mut pending: Vec<Teacher> = self
            .lock()?
            .teachers
            .iter()
            .filter(|t| t.status == TeacherStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(pending)
    }

    fn insert_student(&self, student: &Student) -> Result<(), StoreError> {
        self.lock()?.students.push(student.clone());
        Ok(())
    }

    fn students_for_exam(&self, exam_id: &str) -> Result<Vec<Student>, StoreError> {
        let mut students: Vec<Student> = self
            .lock()?
            .students
            .iter()
            .filter(|s| s.exam_id == exam_id)
            .cloned()
            .collect();
        students.sort_by_key(|s| s.name.to_lowercase());
        Ok(students)
    }

    fn find_student(&self, exam_id: &str, name: &str) -> Result<Option<Student>, StoreError> {
        let needle = name.trim().to_lowercase();
        Ok(self
            .lock()?
            .students
            .iter()
            .find(|s| s.exam_id == exam_id && s.name.to_lowercase() == needle)
            .cloned())
    }

    fn insert_session(&self, session: &Session) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.sessions.iter().any(|s| s.token == session.token) {
            return Err(StoreError::Conflict(format!("session {}", session.token)));
        }
        inner.sessions.push(session.clone());
        Ok(())
    }

    fn get_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        Ok(self
            .lock()?
            .sessions
            .iter()
            .find(|s| s.token == token)
            .cloned())
    }

    fn replace_result(&self, result: &ResultRecord) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.results.retain(|r| r.token != result.token);
        inner.results.push(result.clone());
        Ok(())
    }

    fn get_result(&self, token: &str) -> Result<Option<ResultRecord>, StoreError> {
        Ok(self
            .lock()?
            .results
            .iter()
            .find(|r| r.token == token)
            .cloned())
    }

    fn results_for_exam(&self, exam_id: &str) -> Result<Vec<ResultRecord>, StoreError> {
        let mut results: Vec<ResultRecord> = self
            .lock()?
            .results
            .iter()
            .filter(|r| r.exam_id == exam_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(results)
    }
}
