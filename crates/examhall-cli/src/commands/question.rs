//! The `examhall question` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examhall_core::grade::{choice_label, parse_selection};

pub fn add(
    config_path: Option<PathBuf>,
    exam_id: String,
    prompt: String,
    choices: Vec<String>,
    answer: String,
    teacher_token: Option<String>,
) -> Result<()> {
    let answer_index = parse_selection(&answer)
        .ok_or_else(|| anyhow::anyhow!("invalid answer key '{answer}' (use an index or a letter)"))?;

    let (_, engine) = super::open_engine(config_path)?;
    let question = engine.add_question(
        &exam_id,
        &prompt,
        choices,
        answer_index,
        teacher_token.as_deref(),
    )?;
    println!("Added question {} to exam {exam_id}", question.id);
    Ok(())
}

pub fn list(config_path: Option<PathBuf>, exam_id: String) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    let questions = engine.list_questions(&exam_id)?;

    if questions.is_empty() {
        println!("Exam {exam_id} has no questions.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Prompt", "Choices", "Answer"]);
    for q in &questions {
        let choices = q
            .choices
            .iter()
            .enumerate()
            .map(|(i, c)| match choice_label(i) {
                Some(label) => format!("{label}. {c}"),
                None => c.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n");
        let answer = choice_label(q.answer_index)
            .map(|l| l.to_string())
            .unwrap_or_else(|| q.answer_index.to_string());
        table.add_row(vec![
            Cell::new(&q.id),
            Cell::new(&q.prompt),
            Cell::new(choices),
            Cell::new(answer),
        ]);
    }
    println!("{table}");
    Ok(())
}
