//! Durable `ExamStore` backed by SQLite.
//!
//! Opens the database in WAL mode with a busy timeout, guards against newer
//! on-disk schema versions, and stores choice lists, session snapshots, and
//! answer details as JSON columns.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::DateTime;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use examhall_core::grade::ResultRecord;
use examhall_core::model::{Exam, ExamStatus, Question, Student, Teacher};
use examhall_core::session::Session;
use examhall_core::store::{ExamStore, StoreError};

/// Schema version written to `PRAGMA user_version`.
const SCHEMA_VERSION: i64 = 1;

/// Busy timeout before a locked database read/write gives up (ms).
const BUSY_TIMEOUT_MS: u64 = 5_000;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS exams (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    duration_minutes INTEGER NOT NULL,
    status TEXT NOT NULL,
    teacher_id TEXT,
    tag TEXT
);

CREATE TABLE IF NOT EXISTS questions (
    id TEXT PRIMARY KEY,
    exam_id TEXT NOT NULL,
    prompt TEXT NOT NULL,
    choices TEXT NOT NULL,
    answer_index INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_questions_exam ON questions(exam_id);

CREATE TABLE IF NOT EXISTS teachers (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    subject TEXT,
    status TEXT NOT NULL,
    token TEXT UNIQUE
);

CREATE TABLE IF NOT EXISTS registered_students (
    id TEXT PRIMARY KEY,
    exam_id TEXT NOT NULL,
    name TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_regstudents_exam ON registered_students(exam_id);

CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    exam_id TEXT NOT NULL,
    student_name TEXT,
    tag TEXT,
    started_at INTEGER NOT NULL,
    deadline INTEGER NOT NULL,
    question_state TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS results (
    id TEXT PRIMARY KEY,
    token TEXT NOT NULL UNIQUE,
    exam_id TEXT NOT NULL,
    student_name TEXT,
    score INTEGER NOT NULL,
    total INTEGER NOT NULL,
    submitted_at INTEGER NOT NULL,
    answers TEXT NOT NULL,
    answers_detail TEXT NOT NULL
);
";

/// A durable exam store backed by a SQLite database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(db_err)?;
        let store = Self::from_connection(conn)?;
        tracing::debug!("opened sqlite store at {}", path.display());
        Ok(store)
    }

    /// Open a private in-memory database (tests, dry runs).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "journal_mode", "wal")
            .map_err(db_err)?;
        conn.pragma_update(None, "synchronous", "normal")
            .map_err(db_err)?;
        conn.pragma_update(None, "foreign_keys", "on")
            .map_err(db_err)?;
        conn.pragma_update(None, "busy_timeout", BUSY_TIMEOUT_MS)
            .map_err(db_err)?;

        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(db_err)?;
        if version > SCHEMA_VERSION {
            return Err(StoreError::Backend(format!(
                "database schema version {version} is newer than supported {SCHEMA_VERSION}"
            )));
        }
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(db_err)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("connection lock poisoned".into()))
    }
}

/// Map a rusqlite error onto the store taxonomy.
fn db_err(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::Conflict(err.to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

fn timestamp(secs: i64) -> Result<chrono::DateTime<chrono::Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| StoreError::Serialization(format!("invalid timestamp: {secs}")))
}

fn exam_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Exam, String)> {
    let status: String = row.get("status")?;
    Ok((
        Exam {
            id: row.get("id")?,
            title: row.get("title")?,
            duration_minutes: row.get("duration_minutes")?,
            status: ExamStatus::Draft, // overwritten by the caller
            teacher_id: row.get("teacher_id")?,
            tag: row.get("tag")?,
        },
        status,
    ))
}

fn parse_exam(pair: (Exam, String)) -> Result<Exam, StoreError> {
    let (mut exam, status) = pair;
    exam.status = status
        .parse()
        .map_err(|e: String| StoreError::Serialization(e))?;
    Ok(exam)
}

fn teacher_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Teacher, String)> {
    let status: String = row.get("status")?;
    Ok((
        Teacher {
            id: row.get("id")?,
            name: row.get("name")?,
            password_hash: row.get("password_hash")?,
            subject: row.get("subject")?,
            status: Default::default(), // overwritten by the caller
            token: row.get("token")?,
        },
        status,
    ))
}

fn parse_teacher(pair: (Teacher, String)) -> Result<Teacher, StoreError> {
    let (mut teacher, status) = pair;
    teacher.status = status
        .parse()
        .map_err(|e: String| StoreError::Serialization(e))?;
    Ok(teacher)
}

impl ExamStore for SqliteStore {
    fn insert_exam(&self, exam: &Exam) -> Result<(), StoreError> {
        self.conn()?
            .execute(
                "INSERT INTO exams (id, title, duration_minutes, status, teacher_id, tag)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    exam.id,
                    exam.title,
                    exam.duration_minutes,
                    exam.status.to_string(),
                    exam.teacher_id,
                    exam.tag,
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn get_exam(&self, id: &str) -> Result<Option<Exam>, StoreError> {
        self.conn()?
            .query_row(
                "SELECT id, title, duration_minutes, status, teacher_id, tag
                 FROM exams WHERE id = ?1",
                params![id],
                exam_from_row,
            )
            .optional()
            .map_err(db_err)?
            .map(parse_exam)
            .transpose()
    }

    fn list_exams(&self) -> Result<Vec<Exam>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, duration_minutes, status, teacher_id, tag
                 FROM exams ORDER BY rowid",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], exam_from_row)
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;
        rows.into_iter().map(parse_exam).collect()
    }

    fn set_exam_status(&self, id: &str, status: ExamStatus) -> Result<(), StoreError> {
        let updated = self
            .conn()?
            .execute(
                "UPDATE exams SET status = ?1 WHERE id = ?2",
                params![status.to_string(), id],
            )
            .map_err(db_err)?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("exam {id}")));
        }
        Ok(())
    }

    fn insert_question(&self, question: &Question) -> Result<(), StoreError> {
        let choices = serde_json::to_string(&question.choices)?;
        self.conn()?
            .execute(
                "INSERT INTO questions (id, exam_id, prompt, choices, answer_index)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    question.id,
                    question.exam_id,
                    question.prompt,
                    choices,
                    question.answer_index as i64,
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn questions_for_exam(&self, exam_id: &str) -> Result<Vec<Question>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, exam_id, prompt, choices, answer_index
                 FROM questions WHERE exam_id = ?1 ORDER BY rowid",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![exam_id], |row| {
                Ok((
                    row.get::<_, String>("id")?,
                    row.get::<_, String>("exam_id")?,
                    row.get::<_, String>("prompt")?,
                    row.get::<_, String>("choices")?,
                    row.get::<_, i64>("answer_index")?,
                ))
            })
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;

        rows.into_iter()
            .map(|(id, exam_id, prompt, choices, answer_index)| {
                Ok(Question {
                    id,
                    exam_id,
                    prompt,
                    choices: serde_json::from_str(&choices)?,
                    answer_index: answer_index as usize,
                })
            })
            .collect()
    }

    fn delete_questions(&self, exam_id: &str) -> Result<usize, StoreError> {
        self.conn()?
            .execute("DELETE FROM questions WHERE exam_id = ?1", params![exam_id])
            .map_err(db_err)
    }

    fn insert_teacher(&self, teacher: &Teacher) -> Result<(), StoreError> {
        self.conn()?
            .execute(
                "INSERT INTO teachers (id, name, password_hash, subject, status, token)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    teacher.id,
                    teacher.name,
                    teacher.password_hash,
                    teacher.subject,
                    teacher.status.to_string(),
                    teacher.token,
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn get_teacher(&self, id: &str) -> Result<Option<Teacher>, StoreError> {
        self.conn()?
            .query_row(
                "SELECT id, name, password_hash, subject, status, token
                 FROM teachers WHERE id = ?1",
                params![id],
                teacher_from_row,
            )
            .optional()
            .map_err(db_err)?
            .map(parse_teacher)
            .transpose()
    }

    fn get_teacher_by_name(&self, name: &str) -> Result<Option<Teacher>, StoreError> {
        self.conn()?
            .query_row(
                "SELECT id, name, password_hash, subject, status, token
                 FROM teachers WHERE name = ?1",
                params![name],
                teacher_from_row,
            )
            .optional()
            .map_err(db_err)?
            .map(parse_teacher)
            .transpose()
    }

    fn get_teacher_by_token(&self, token: &str) -> Result<Option<Teacher>, StoreError> {
        self.conn()?
            .query_row(
                "SELECT id, name, password_hash, subject, status, token
                 FROM teachers WHERE token = ?1",
                params![token],
                teacher_from_row,
            )
            .optional()
            .map_err(db_err)?
            .map(parse_teacher)
            .transpose()
    }

    fn update_teacher(&self, teacher: &Teacher) -> Result<(), StoreError> {
        let updated = self
            .conn()?
            .execute(
                "UPDATE teachers
                 SET name = ?2, password_hash = ?3, subject = ?4, status = ?5, token = ?6
                 WHERE id = ?1",
                params![
                    teacher.id,
                    teacher.name,
                    teacher.password_hash,
                    teacher.subject,
                    teacher.status.to_string(),
                    teacher.token,
                ],
            )
            .map_err(db_err)?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("teacher {}", teacher.id)));
        }
        Ok(())
    }

    fn pending_teachers(&self) -> Result<Vec<Teacher>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, password_hash, subject, status, token
                 FROM teachers WHERE status = 'pending' ORDER BY name",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], teacher_from_row)
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;
        rows.into_iter().map(parse_teacher).collect()
    }

    fn insert_student(&self, student: &Student) -> Result<(), StoreError> {
        self.conn()?
            .execute(
                "INSERT INTO registered_students (id, exam_id, name) VALUES (?1, ?2, ?3)",
                params![student.id, student.exam_id, student.name],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn students_for_exam(&self, exam_id: &str) -> Result<Vec<Student>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, exam_id, name FROM registered_students
                 WHERE exam_id = ?1 ORDER BY name COLLATE NOCASE",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![exam_id], |row| {
                Ok(Student {
                    id: row.get("id")?,
                    exam_id: row.get("exam_id")?,
                    name: row.get("name")?,
                })
            })
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;
        Ok(rows)
    }

    fn find_student(&self, exam_id: &str, name: &str) -> Result<Option<Student>, StoreError> {
        self.conn()?
            .query_row(
                "SELECT id, exam_id, name FROM registered_students
                 WHERE exam_id = ?1 AND LOWER(name) = LOWER(?2)",
                params![exam_id, name.trim()],
                |row| {
                    Ok(Student {
                        id: row.get("id")?,
                        exam_id: row.get("exam_id")?,
                        name: row.get("name")?,
                    })
                },
            )
            .optional()
            .map_err(db_err)
    }

    fn insert_session(&self, session: &Session) -> Result<(), StoreError> {
        let question_state = serde_json::to_string(&session.questions)?;
        self.conn()?
            .execute(
                "INSERT INTO sessions
                 (token, exam_id, student_name, tag, started_at, deadline, question_state)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    session.token,
                    session.exam_id,
                    session.student_name,
                    session.tag,
                    session.started_at.timestamp(),
                    session.deadline.timestamp(),
                    question_state,
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn get_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let row = self
            .conn()?
            .query_row(
                "SELECT token, exam_id, student_name, tag, started_at, deadline, question_state
                 FROM sessions WHERE token = ?1",
                params![token],
                |row| {
                    Ok((
                        row.get::<_, String>("token")?,
                        row.get::<_, String>("exam_id")?,
                        row.get::<_, Option<String>>("student_name")?,
                        row.get::<_, Option<String>>("tag")?,
                        row.get::<_, i64>("started_at")?,
                        row.get::<_, i64>("deadline")?,
                        row.get::<_, String>("question_state")?,
                    ))
                },
            )
            .optional()
            .map_err(db_err)?;

        let Some((token, exam_id, student_name, tag, started_at, deadline, question_state)) = row
        else {
            return Ok(None);
        };

        Ok(Some(Session {
            token,
            exam_id,
            student_name,
            tag,
            started_at: timestamp(started_at)?,
            deadline: timestamp(deadline)?,
            questions: serde_json::from_str(&question_state)?,
        }))
    }

    fn replace_result(&self, result: &ResultRecord) -> Result<(), StoreError> {
        let answers = serde_json::to_string(&result.answers)?;
        let details = serde_json::to_string(&result.details)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db_err)?;
        tx.execute(
            "DELETE FROM results WHERE token = ?1",
            params![result.token],
        )
        .map_err(db_err)?;
        tx.execute(
            "INSERT INTO results
             (id, token, exam_id, student_name, score, total, submitted_at, answers, answers_detail)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                result.id,
                result.token,
                result.exam_id,
                result.student_name,
                result.score,
                result.total,
                result.submitted_at.timestamp(),
                answers,
                details,
            ],
        )
        .map_err(db_err)?;
        tx.commit().map_err(db_err)?;
        Ok(())
    }

    fn get_result(&self, token: &str) -> Result<Option<ResultRecord>, StoreError> {
        let row = self
            .conn()?
            .query_row(
                "SELECT id, token, exam_id, student_name, score, total, submitted_at,
                        answers, answers_detail
                 FROM results WHERE token = ?1",
                params![token],
                result_row,
            )
            .optional()
            .map_err(db_err)?;
        row.map(parse_result).transpose()
    }

    fn results_for_exam(&self, exam_id: &str) -> Result<Vec<ResultRecord>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, token, exam_id, student_name, score, total, submitted_at,
                        answers, answers_detail
                 FROM results WHERE exam_id = ?1 ORDER BY submitted_at DESC",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![exam_id], result_row)
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;
        rows.into_iter().map(parse_result).collect()
    }
}

type ResultRow = (
    String,
    String,
    String,
    Option<String>,
    u32,
    u32,
    i64,
    String,
    String,
);

fn result_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ResultRow> {
    Ok((
        row.get("id")?,
        row.get("token")?,
        row.get("exam_id")?,
        row.get("student_name")?,
        row.get("score")?,
        row.get("total")?,
        row.get("submitted_at")?,
        row.get("answers")?,
        row.get("answers_detail")?,
    ))
}

fn parse_result(row: ResultRow) -> Result<ResultRecord, StoreError> {
    let (id, token, exam_id, student_name, score, total, submitted_at, answers, details) = row;
    Ok(ResultRecord {
        id,
        token,
        exam_id,
        student_name,
        score,
        total,
        submitted_at: timestamp(submitted_at)?,
        answers: serde_json::from_str(&answers)?,
        details: serde_json::from_str(&details)?,
    })
}
