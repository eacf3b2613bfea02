//! The `examhall init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create examhall.toml
    if std::path::Path::new("examhall.toml").exists() {
        println!("examhall.toml already exists, skipping.");
    } else {
        std::fs::write("examhall.toml", SAMPLE_CONFIG)?;
        println!("Created examhall.toml");
    }

    // Create example question bank
    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: examhall bank validate --file banks/example.toml");
    println!("  2. Run: examhall bank load --file banks/example.toml");
    println!("  3. Open the exam and start a session");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examhall configuration

db_path = "./examhall.db"
default_duration_minutes = 30
bank_dir = "./banks"
"#;

const EXAMPLE_BANK: &str = r#"[exam]
title = "Example Quiz"
description = "A short example question bank to get started"
duration_minutes = 15
tag = "example"

[[questions]]
id = "capital"
prompt = "What is the capital of France?"
choices = ["Berlin", "Paris", "Madrid", "Rome"]
answer = "B"

[[questions]]
id = "arithmetic"
prompt = "What is 6 x 7?"
choices = ["41", "42", "43", "44"]
answer_index = 1

[[questions]]
id = "ocean"
prompt = "Which is the largest ocean?"
choices = ["Atlantic", "Indian", "Pacific", "Arctic"]
answer = "C"
"#;
