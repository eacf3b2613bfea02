//! The `examhall exam` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn create(
    config_path: Option<PathBuf>,
    title: String,
    duration: Option<u32>,
    tag: Option<String>,
    teacher_token: Option<String>,
) -> Result<()> {
    let (config, engine) = super::open_engine(config_path)?;
    let duration = duration.unwrap_or(config.default_duration_minutes);
    let exam = engine.create_exam(&title, duration, tag, teacher_token.as_deref())?;
    println!("Created exam {} '{}' ({duration} min)", exam.id, exam.title);
    println!("Add questions, then run: examhall exam open --exam-id {}", exam.id);
    Ok(())
}

pub fn open(config_path: Option<PathBuf>, exam_id: String) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    let exam = engine.open_exam(&exam_id)?;
    println!("Exam {} '{}' is now open", exam.id, exam.title);
    Ok(())
}

pub fn close(config_path: Option<PathBuf>, exam_id: String) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    let exam = engine.close_exam(&exam_id)?;
    println!("Exam {} '{}' is now closed", exam.id, exam.title);
    Ok(())
}

pub fn list(config_path: Option<PathBuf>) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    let overviews = engine.list_exams()?;

    if overviews.is_empty() {
        println!("No exams yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Id", "Title", "Status", "Duration", "Questions", "Subject", "Tag",
    ]);
    for o in &overviews {
        table.add_row(vec![
            Cell::new(&o.id),
            Cell::new(&o.title),
            Cell::new(o.status),
            Cell::new(format!("{} min", o.duration_minutes)),
            Cell::new(o.question_count),
            Cell::new(o.subject.as_deref().unwrap_or("-")),
            Cell::new(o.tag.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
    Ok(())
}
