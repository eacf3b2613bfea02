//! Backend conformance tests run against both stores.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};

use examhall_core::grade::ResultRecord;
use examhall_core::model::{Exam, ExamStatus, Question, Student, Teacher, TeacherStatus};
use examhall_core::session::{PresentedQuestion, Session};
use examhall_core::store::{ExamStore, StoreError};
use examhall_store::{MemoryStore, SqliteStore};

fn backends() -> Vec<(&'static str, Box<dyn ExamStore>)> {
    vec![
        ("memory", Box::new(MemoryStore::new())),
        ("sqlite", Box::new(SqliteStore::open_in_memory().unwrap())),
    ]
}

fn exam(id: &str) -> Exam {
    Exam {
        id: id.into(),
        title: format!("Exam {id}"),
        duration_minutes: 30,
        status: ExamStatus::Draft,
        teacher_id: None,
        tag: Some("spring".into()),
    }
}

fn question(id: &str, exam_id: &str) -> Question {
    Question {
        id: id.into(),
        exam_id: exam_id.into(),
        prompt: format!("Prompt {id}"),
        choices: vec!["a".into(), "b".into(), "c".into()],
        answer_index: 1,
    }
}

#[test]
fn exam_roundtrip_and_status_update() {
    for (name, store) in backends() {
        store.insert_exam(&exam("e1")).unwrap();
        let loaded = store.get_exam("e1").unwrap().unwrap();
        assert_eq!(loaded.title, "Exam e1", "backend {name}");
        assert_eq!(loaded.status, ExamStatus::Draft);
        assert_eq!(loaded.tag.as_deref(), Some("spring"));

        store.set_exam_status("e1", ExamStatus::Open).unwrap();
        assert_eq!(
            store.get_exam("e1").unwrap().unwrap().status,
            ExamStatus::Open
        );

        assert!(store.get_exam("missing").unwrap().is_none());
        assert!(matches!(
            store.set_exam_status("missing", ExamStatus::Open),
            Err(StoreError::NotFound(_))
        ));
    }
}

#[test]
fn duplicate_exam_id_conflicts() {
    for (name, store) in backends() {
        store.insert_exam(&exam("e1")).unwrap();
        assert!(
            matches!(store.insert_exam(&exam("e1")), Err(StoreError::Conflict(_))),
            "backend {name}"
        );
    }
}

#[test]
fn questions_keep_insertion_order_and_delete_counts() {
    for (name, store) in backends() {
        store.insert_exam(&exam("e1")).unwrap();
        for i in 0..5 {
            store.insert_question(&question(&format!("q{i}"), "e1")).unwrap();
        }
        store.insert_question(&question("other", "e2")).unwrap();

        let questions = store.questions_for_exam("e1").unwrap();
        assert_eq!(questions.len(), 5, "backend {name}");
        let ids: Vec<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, ["q0", "q1", "q2", "q3", "q4"]);
        assert_eq!(questions[0].choices, vec!["a", "b", "c"]);

        assert_eq!(store.delete_questions("e1").unwrap(), 5);
        assert!(store.questions_for_exam("e1").unwrap().is_empty());
        assert_eq!(store.questions_for_exam("e2").unwrap().len(), 1);
    }
}

#[test]
fn teacher_lookup_and_update() {
    for (name, store) in backends() {
        let teacher = Teacher::new("ada", "secret", Some("maths".into()));
        store.insert_teacher(&teacher).unwrap();

        // Name is unique.
        let dup = Teacher::new("ada", "other", None);
        assert!(
            matches!(store.insert_teacher(&dup), Err(StoreError::Conflict(_))),
            "backend {name}"
        );

        assert_eq!(store.pending_teachers().unwrap().len(), 1);
        assert!(store.get_teacher_by_token("nope").unwrap().is_none());

        let mut approved = store.get_teacher_by_name("ada").unwrap().unwrap();
        approved.status = TeacherStatus::Approved;
        approved.token = Some("token-123".into());
        store.update_teacher(&approved).unwrap();

        let by_token = store.get_teacher_by_token("token-123").unwrap().unwrap();
        assert_eq!(by_token.name, "ada");
        assert_eq!(by_token.subject.as_deref(), Some("maths"));
        assert!(store.pending_teachers().unwrap().is_empty());
    }
}

#[test]
fn roster_ordering_and_case_insensitive_find() {
    for (name, store) in backends() {
        store.insert_exam(&exam("e1")).unwrap();
        store.insert_student(&Student::new("e1", "zoe")).unwrap();
        store.insert_student(&Student::new("e1", "Ada")).unwrap();
        store.insert_student(&Student::new("e1", "mara")).unwrap();

        let roster = store.students_for_exam("e1").unwrap();
        let names: Vec<&str> = roster.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Ada", "mara", "zoe"], "backend {name}");

        assert!(store.find_student("e1", "ADA").unwrap().is_some());
        assert!(store.find_student("e1", "  ada ").unwrap().is_some());
        assert!(store.find_student("e1", "nobody").unwrap().is_none());
        assert!(store.find_student("e2", "Ada").unwrap().is_none());
    }
}

#[test]
fn session_snapshot_survives_roundtrip() {
    for (name, store) in backends() {
        let session = Session {
            token: "tok12345".into(),
            exam_id: "e1".into(),
            student_name: Some("Ada".into()),
            tag: Some("spring".into()),
            started_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            deadline: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            questions: vec![PresentedQuestion {
                question_id: "q1".into(),
                prompt: "Pick one".into(),
                choices: vec!["b".into(), "a".into()],
                correct_index: 1,
            }],
        };
        store.insert_session(&session).unwrap();

        let loaded = store.get_session("tok12345").unwrap().unwrap();
        assert_eq!(loaded.started_at, session.started_at, "backend {name}");
        assert_eq!(loaded.deadline, session.deadline);
        assert_eq!(loaded.questions.len(), 1);
        assert_eq!(loaded.questions[0].choices, vec!["b", "a"]);
        assert_eq!(loaded.questions[0].correct_index, 1);

        assert!(store.get_session("missing").unwrap().is_none());
    }
}

#[test]
fn replace_result_keeps_last_submission() {
    for (name, store) in backends() {
        let submitted_at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 15, 0).unwrap();
        let first = ResultRecord {
            id: "r1".into(),
            token: "tok".into(),
            exam_id: "e1".into(),
            student_name: Some("Ada".into()),
            score: 1,
            total: 3,
            submitted_at,
            answers: HashMap::from([("q1".to_string(), "A".to_string())]),
            details: vec![],
        };
        store.replace_result(&first).unwrap();

        let second = ResultRecord {
            id: "r2".into(),
            score: 3,
            submitted_at: submitted_at + chrono::Duration::minutes(2),
            ..first.clone()
        };
        store.replace_result(&second).unwrap();

        let loaded = store.get_result("tok").unwrap().unwrap();
        assert_eq!(loaded.id, "r2", "backend {name}");
        assert_eq!(loaded.score, 3);
        assert_eq!(loaded.answers.get("q1").map(String::as_str), Some("A"));

        let all = store.results_for_exam("e1").unwrap();
        assert_eq!(all.len(), 1);
    }
}

#[test]
fn results_for_exam_most_recent_first() {
    for (name, store) in backends() {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        for (i, token) in ["t1", "t2", "t3"].iter().enumerate() {
            store
                .replace_result(&ResultRecord {
                    id: format!("r{i}"),
                    token: token.to_string(),
                    exam_id: "e1".into(),
                    student_name: None,
                    score: i as u32,
                    total: 3,
                    submitted_at: base + chrono::Duration::minutes(i as i64),
                    answers: HashMap::new(),
                    details: vec![],
                })
                .unwrap();
        }

        let results = store.results_for_exam("e1").unwrap();
        let tokens: Vec<&str> = results.iter().map(|r| r.token.as_str()).collect();
        assert_eq!(tokens, ["t3", "t2", "t1"], "backend {name}");
    }
}

#[test]
fn sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("examhall.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store.insert_exam(&exam("e1")).unwrap();
        store.insert_question(&question("q1", "e1")).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    assert!(store.get_exam("e1").unwrap().is_some());
    assert_eq!(store.questions_for_exam("e1").unwrap().len(), 1);
}

#[test]
fn sqlite_store_refuses_newer_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.pragma_update(None, "user_version", 999).unwrap();
    }

    let err = SqliteStore::open(&path).unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
    assert!(err.to_string().contains("newer"));
}
