//! The `examhall student` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examhall_core::engine::Enrollment;

pub fn add(config_path: Option<PathBuf>, exam_id: String, name: String) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    match engine.register_student(&exam_id, &name)? {
        Enrollment::Added(student) => {
            println!("Registered '{}' for exam {exam_id}", student.name);
        }
        Enrollment::AlreadyRegistered(student) => {
            println!("'{}' is already registered for exam {exam_id}", student.name);
        }
    }
    Ok(())
}

pub fn list(config_path: Option<PathBuf>, exam_id: String) -> Result<()> {
    let (_, engine) = super::open_engine(config_path)?;
    let students = engine.list_students(&exam_id)?;

    if students.is_empty() {
        println!("No students registered for exam {exam_id}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Name"]);
    for s in &students {
        table.add_row(vec![Cell::new(&s.id), Cell::new(&s.name)]);
    }
    println!("{table}");
    Ok(())
}
