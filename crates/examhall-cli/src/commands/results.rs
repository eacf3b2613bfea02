//! The `examhall result` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn show(config_path: Option<PathBuf>, token: String) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    let record = engine.result(&token)?;

    println!(
        "Result for session {} ({}):",
        record.token,
        record.student_name.as_deref().unwrap_or("Anonymous")
    );
    println!(
        "Score: {}/{} — submitted {}",
        record.score,
        record.total,
        record.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let mut table = Table::new();
    table.set_header(vec!["Question", "Selected", "Correct", "Outcome"]);
    for d in &record.details {
        let selected = match (d.selected_label, &d.selected_text) {
            (Some(label), Some(text)) => format!("{label}. {text}"),
            (Some(label), None) => format!("{label}. (out of range)"),
            _ => "-".to_string(),
        };
        let correct = match (d.correct_label, &d.correct_text) {
            (Some(label), Some(text)) => format!("{label}. {text}"),
            _ => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(&d.prompt),
            Cell::new(selected),
            Cell::new(correct),
            Cell::new(if d.is_correct { "correct" } else { "wrong" }),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn scores(config_path: Option<PathBuf>, teacher_token: String) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    let board = engine.teacher_scoreboard(&teacher_token)?;

    if board.exams.is_empty() {
        println!("No recorded submissions yet.");
        return Ok(());
    }

    for exam in &board.exams {
        println!(
            "{} ({}) — avg {:.1}%",
            exam.exam_title, exam.exam_id, exam.avg_percentage
        );

        let mut table = Table::new();
        table.set_header(vec!["Student", "Score", "Percent", "Submitted"]);
        for row in &exam.rows {
            table.add_row(vec![
                Cell::new(&row.student_name),
                Cell::new(format!("{}/{}", row.score, row.total)),
                Cell::new(format!("{:.1}%", row.percentage)),
                Cell::new(row.submitted_at.format("%Y-%m-%d %H:%M")),
            ]);
        }
        println!("{table}\n");
    }

    println!(
        "{} submission(s), overall average score {:.1}",
        board.total_submissions, board.overall_avg_score
    );
    Ok(())
}

pub fn stats(config_path: Option<PathBuf>, exam_id: String) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    let stats = engine.exam_stats(&exam_id)?;

    if stats.attempts == 0 {
        println!("Exam {exam_id} has no recorded submissions.");
        return Ok(());
    }

    println!("Exam {exam_id}: {} attempt(s)", stats.attempts);
    println!(
        "Mean score {:.1} ({:.1}%), best {}, worst {}",
        stats.mean_score, stats.mean_percentage, stats.best, stats.worst
    );
    Ok(())
}
