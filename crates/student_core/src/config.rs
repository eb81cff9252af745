//! Fixed process configuration.
//!
//! The program takes no flags and reads no environment variables; every path
//! is derived from one base directory.

use crate::logging::default_log_level;
use std::io;
use std::path::{Path, PathBuf};

pub const DATABASE_FILE_NAME: &str = "students.sqlite3";
pub const LOG_DIR_NAME: &str = "logs";

/// Resolved locations and levels for one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file acting as the connection descriptor.
    pub database_path: PathBuf,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
    pub log_level: &'static str,
}

impl AppConfig {
    /// Lays out the database and logs under the current working directory.
    pub fn from_current_dir() -> io::Result<Self> {
        Ok(Self::in_dir(std::env::current_dir()?))
    }

    /// Lays out the database and logs under `base`.
    pub fn in_dir(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            database_path: base.join(DATABASE_FILE_NAME),
            log_dir: base.join(LOG_DIR_NAME),
            log_level: default_log_level(),
        }
    }
}
