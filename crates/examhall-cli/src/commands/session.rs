//! The `examhall session` commands.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

use examhall_core::grade::choice_label;

pub fn start(config_path: Option<PathBuf>, exam_id: String, name: Option<String>) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    let session = engine.start_session(&exam_id, name, Utc::now())?;

    println!("Session token: {}", session.token);
    println!(
        "Deadline: {} ({} min remaining)",
        session.deadline.format("%Y-%m-%d %H:%M:%S UTC"),
        session.remaining_secs(Utc::now()) / 60
    );
    println!();

    for (i, q) in session.questions.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, q.question_id, q.prompt);
        for (j, choice) in q.choices.iter().enumerate() {
            match choice_label(j) {
                Some(label) => println!("   {label}. {choice}"),
                None => println!("   {j}. {choice}"),
            }
        }
        println!();
    }

    println!(
        "Submit with: examhall session submit --token {} --answer <question_id>=<letter> ...",
        session.token
    );
    Ok(())
}

pub fn submit(
    config_path: Option<PathBuf>,
    token: String,
    answers: Vec<String>,
    answers_json: Option<PathBuf>,
    name: Option<String>,
) -> Result<()> {
    let mut parsed: HashMap<String, String> = HashMap::new();

    if let Some(path) = answers_json {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read answers file: {}", path.display()))?;
        parsed = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse answers JSON: {}", path.display()))?;
    }

    for pair in &answers {
        let (question_id, selection) = pair
            .split_once('=')
            .with_context(|| format!("invalid answer '{pair}', expected question_id=selection"))?;
        parsed.insert(question_id.trim().to_string(), selection.trim().to_string());
    }

    let (_, engine) = super::open_engine(config_path)?;
    let record = engine.submit(&token, name, parsed, Utc::now())?;

    println!("Score: {}/{}", record.score, record.total);
    println!("View details with: examhall result show --token {token}");
    Ok(())
}
