//! CLI command implementations.

pub mod bank;
pub mod exam;
pub mod init;
pub mod question;
pub mod results;
pub mod session;
pub mod student;
pub mod teacher;

use std::path::PathBuf;

use anyhow::{Context, Result};

use examhall_core::engine::ExamEngine;
use examhall_store::SqliteStore;

use crate::config::{load_config_from, ExamhallConfig};

/// Load config and open the engine over the configured database.
fn open_engine(config_path: Option<PathBuf>) -> Result<(ExamhallConfig, ExamEngine<SqliteStore>)> {
    let config = load_config_from(config_path.as_deref())?;
    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("failed to open database: {}", config.db_path.display()))?;
    Ok((config, ExamEngine::new(store)))
}
