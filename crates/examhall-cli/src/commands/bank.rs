//! The `examhall bank` commands.

use std::path::PathBuf;

use anyhow::Result;

use examhall_core::bank::{load_bank_directory, parse_bank, validate_bank};

pub fn load(
    config_path: Option<PathBuf>,
    file: PathBuf,
    exam_id: Option<String>,
    overwrite: bool,
    teacher_token: Option<String>,
) -> Result<()> {
    let bank = parse_bank(&file)?;

    let warnings = validate_bank(&bank);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        eprintln!("{prefix} WARNING: {}", w.message);
    }

    let (_, engine) = super::open_engine(config_path)?;
    match exam_id {
        Some(exam_id) => {
            let count =
                engine.load_bank_into(&exam_id, bank, overwrite, teacher_token.as_deref())?;
            println!("Loaded {count} question(s) into exam {exam_id}");
        }
        None => {
            let (exam, count) = engine.import_bank(bank, teacher_token.as_deref())?;
            println!(
                "Created exam {} '{}' with {count} question(s)",
                exam.id, exam.title
            );
            println!("Open it with: examhall exam open --exam-id {}", exam.id);
        }
    }
    Ok(())
}

pub fn validate(file: PathBuf) -> Result<()> {
    let banks = if file.is_dir() {
        load_bank_directory(&file)?
    } else {
        vec![parse_bank(&file)?]
    };

    let mut total_warnings = 0;

    for bank in &banks {
        println!("Bank: {} ({} questions)", bank.title, bank.questions.len());

        let warnings = validate_bank(bank);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
