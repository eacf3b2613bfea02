//! The `examhall teacher` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn register(
    config_path: Option<PathBuf>,
    name: String,
    password: String,
    subject: Option<String>,
) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    let teacher = engine.register_teacher(&name, &password, subject)?;
    println!(
        "Registered teacher {} '{}' (pending approval)",
        teacher.id, teacher.name
    );
    println!("Approve with: examhall teacher approve --teacher-id {}", teacher.id);
    Ok(())
}

pub fn approve(config_path: Option<PathBuf>, teacher_id: String) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    let teacher = engine.approve_teacher(&teacher_id)?;
    println!("Approved teacher '{}'", teacher.name);
    if let Some(token) = &teacher.token {
        println!("API token: {token}");
    }
    Ok(())
}

pub fn pending(config_path: Option<PathBuf>) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    let teachers = engine.pending_teachers()?;

    if teachers.is_empty() {
        println!("No teachers awaiting approval.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Name", "Subject"]);
    for t in &teachers {
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(&t.name),
            Cell::new(t.subject.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn login(config_path: Option<PathBuf>, name: String, password: String) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    let teacher = engine.login_teacher(&name, &password)?;
    match &teacher.token {
        Some(token) => println!("API token: {token}"),
        None => println!("Logged in, but no token issued yet."),
    }
    Ok(())
}
