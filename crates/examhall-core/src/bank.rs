//! TOML question-bank parser.
//!
//! Loads question banks from TOML files and directories, and validates them.
//! A bank carries an exam header (title, duration, tag) plus its questions,
//! so one file can seed a whole exam.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::grade::parse_selection;
use crate::model::{short_id, Question};

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    exam: TomlExamHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlExamHeader {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_duration")]
    duration_minutes: u32,
    #[serde(default)]
    tag: Option<String>,
}

fn default_duration() -> u32 {
    30
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    #[serde(default)]
    id: Option<String>,
    prompt: String,
    #[serde(default)]
    choices: Vec<String>,
    /// Numeric answer key into `choices`; takes precedence over `answer`.
    #[serde(default)]
    answer_index: Option<usize>,
    /// Letter answer key ("A", "b", ...), accepted as an alternative.
    #[serde(default)]
    answer: Option<String>,
}

/// A parsed question bank: exam header plus questions.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    /// Exam title from the bank header.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Session time limit in minutes.
    pub duration_minutes: u32,
    /// Optional grouping tag.
    pub tag: Option<String>,
    /// The bank's questions, exam-agnostic until imported.
    pub questions: Vec<BankQuestion>,
}

/// One question inside a bank, before it is bound to an exam.
#[derive(Debug, Clone)]
pub struct BankQuestion {
    /// Question id from the file, or a generated short id.
    pub id: String,
    /// Question text.
    pub prompt: String,
    /// Choices in authored order.
    pub choices: Vec<String>,
    /// Resolved answer key in authored order.
    pub answer_index: usize,
}

impl QuestionBank {
    /// Bind the bank's questions to an exam id.
    pub fn into_questions(self, exam_id: &str) -> Vec<Question> {
        self.questions
            .into_iter()
            .map(|q| Question {
                id: q.id,
                exam_id: exam_id.to_string(),
                prompt: q.prompt,
                choices: q.choices,
                answer_index: q.answer_index,
            })
            .collect()
    }
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank file: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let answer_index = match (q.answer_index, q.answer.as_deref()) {
                (Some(i), _) => i,
                (None, Some(letter)) => parse_selection(letter).unwrap_or(0),
                (None, None) => {
                    tracing::warn!(
                        "question '{}' has no answer key, defaulting to first choice",
                        q.prompt
                    );
                    0
                }
            };
            BankQuestion {
                id: q.id.unwrap_or_else(short_id),
                prompt: q.prompt,
                choices: q.choices,
                answer_index,
            }
        })
        .collect();

    Ok(QuestionBank {
        title: parsed.exam.title,
        description: parsed.exam.description,
        duration_minutes: parsed.exam.duration_minutes,
        tag: parsed.exam.tag,
        questions,
    })
}

/// Recursively load all `.toml` bank files from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in
        std::fs::read_dir(dir).with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a question bank for common issues.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate question ids
    let mut seen_ids = std::collections::HashSet::new();
    for q in &bank.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!("duplicate question id: {}", q.id),
            });
        }
    }

    // Questions need at least two choices to be worth shuffling
    for q in &bank.questions {
        if q.choices.len() < 2 {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!("only {} choice(s), need at least 2", q.choices.len()),
            });
        }
    }

    // Answer key must point into the choice list
    for q in &bank.questions {
        if q.answer_index >= q.choices.len() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!(
                    "answer_index {} out of range for {} choices",
                    q.answer_index,
                    q.choices.len()
                ),
            });
        }
    }

    // Empty prompts
    for q in &bank.questions {
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "prompt is empty".into(),
            });
        }
    }

    if bank.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "bank has no questions".into(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[exam]
title = "Rust Basics Midterm"
description = "Covers ownership and borrowing"
duration_minutes = 45
tag = "2026-spring"

[[questions]]
id = "ownership"
prompt = "Which keyword moves a value into a closure?"
choices = ["move", "copy", "ref", "static"]
answer_index = 0

[[questions]]
id = "borrowck"
prompt = "How many mutable borrows may coexist?"
choices = ["zero", "one", "two", "unlimited"]
answer = "B"
"#;

    #[test]
    fn parse_valid_bank() {
        let bank = parse_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.title, "Rust Basics Midterm");
        assert_eq!(bank.duration_minutes, 45);
        assert_eq!(bank.tag.as_deref(), Some("2026-spring"));
        assert_eq!(bank.questions.len(), 2);
        assert_eq!(bank.questions[0].answer_index, 0);
        // Letter key "B" resolves to index 1.
        assert_eq!(bank.questions[1].answer_index, 1);
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[exam]
title = "Minimal"

[[questions]]
prompt = "Pick one"
choices = ["a", "b"]
answer_index = 1
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.duration_minutes, 30);
        assert!(bank.tag.is_none());
        // Generated id is a short id.
        assert_eq!(bank.questions[0].id.len(), 8);
    }

    #[test]
    fn missing_answer_defaults_to_first_choice() {
        let toml = r#"
[exam]
title = "No Key"

[[questions]]
id = "q1"
prompt = "Pick one"
choices = ["a", "b"]
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.questions[0].answer_index, 0);
    }

    #[test]
    fn into_questions_binds_exam_id() {
        let bank = parse_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        let questions = bank.into_questions("exam42");
        assert!(questions.iter().all(|q| q.exam_id == "exam42"));
        assert_eq!(questions[0].id, "ownership");
    }

    #[test]
    fn validate_duplicate_ids() {
        let toml = r#"
[exam]
title = "Dupes"

[[questions]]
id = "same"
prompt = "First"
choices = ["a", "b"]
answer_index = 0

[[questions]]
id = "same"
prompt = "Second"
choices = ["a", "b"]
answer_index = 1
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
    }

    #[test]
    fn validate_choice_count_and_answer_range() {
        let toml = r#"
[exam]
title = "Broken"

[[questions]]
id = "one-choice"
prompt = "Pick"
choices = ["only"]
answer_index = 0

[[questions]]
id = "oob"
prompt = "Pick"
choices = ["a", "b"]
answer_index = 5
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("at least 2")));
        assert!(warnings.iter().any(|w| w.message.contains("out of range")));
    }

    #[test]
    fn validate_empty_bank() {
        let toml = r#"
[exam]
title = "Empty"
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("no questions")));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_bank_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("midterm.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a bank").unwrap();

        let banks = load_bank_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].title, "Rust Basics Midterm");
    }
}
