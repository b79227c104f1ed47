// Runtime configuration: where the database and the session token live

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

const CONFIG_DIR: &str = ".parkcrm";
const RC_FILE: &str = "rc";
const DEFAULT_DB_FILE: &str = "crm.db";
const DEFAULT_SESSION_FILE: &str = "session";

/// Resolved paths, loaded once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub session_path: PathBuf,
}

impl Config {
    /// Load configuration from `~/.parkcrm/rc`, falling back to defaults
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir()
            .context("Failed to determine home directory")?;
        let config_dir = home.join(CONFIG_DIR);
        let rc_path = config_dir.join(RC_FILE);

        let contents = if rc_path.exists() {
            std::fs::read_to_string(&rc_path)
                .with_context(|| format!("Failed to read config file: {}", rc_path.display()))?
        } else {
            String::new()
        };

        let config = Self::from_rc(&config_dir, &contents);
        log::debug!("Using database {} and session file {}",
            config.db_path.display(), config.session_path.display());
        Ok(config)
    }

    /// Build a config from rc file contents.
    /// Relative paths resolve against `config_dir`. Unknown keys are ignored.
    pub fn from_rc(config_dir: &Path, contents: &str) -> Self {
        let mut db_path = config_dir.join(DEFAULT_DB_FILE);
        let mut session_path = config_dir.join(DEFAULT_SESSION_FILE);

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Ignoring malformed config line: {}", line);
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "data.location" => db_path = resolve(config_dir, value),
                "session.location" => session_path = resolve(config_dir, value),
                other => log::warn!("Ignoring unknown config key: {}", other),
            }
        }

        Self { db_path, session_path }
    }
}

fn resolve(config_dir: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_relative() {
        config_dir.join(path)
    } else {
        path
    }
}
