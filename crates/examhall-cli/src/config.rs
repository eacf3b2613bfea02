//! CLI configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level examhall configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamhallConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Default session time limit when an exam does not specify one.
    #[serde(default = "default_duration")]
    pub default_duration_minutes: u32,
    /// Directory searched for question bank files.
    #[serde(default = "default_bank_dir")]
    pub bank_dir: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./examhall.db")
}

fn default_duration() -> u32 {
    30
}

fn default_bank_dir() -> PathBuf {
    PathBuf::from("./banks")
}

impl Default for ExamhallConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            default_duration_minutes: default_duration(),
            bank_dir: default_bank_dir(),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examhall.toml` in the current directory
/// 2. `~/.config/examhall/config.toml`
///
/// Environment variable override: `EXAMHALL_DB` replaces the database path.
pub fn load_config() -> Result<ExamhallConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamhallConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examhall.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExamhallConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamhallConfig::default(),
    };

    if let Ok(db) = std::env::var("EXAMHALL_DB") {
        if !db.is_empty() {
            config.db_path = PathBuf::from(db);
        }
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examhall"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ExamhallConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./examhall.db"));
        assert_eq!(config.default_duration_minutes, 30);
        assert_eq!(config.bank_dir, PathBuf::from("./banks"));
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
db_path = "/tmp/exams.db"
"#;
        let config: ExamhallConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/exams.db"));
        assert_eq!(config.default_duration_minutes, 30);
    }

    #[test]
    fn missing_explicit_config_fails() {
        let result = load_config_from(Some(Path::new("/nonexistent/examhall.toml")));
        assert!(result.is_err());
    }
}
