//! SQLite storage bootstrap for the student store.
//!
//! # Responsibility
//! - Open and configure the single SQLite connection used by the process.
//! - Bootstrap the `students` relation before any caller touches it.
//!
//! # Invariants
//! - Core code must not read/write student rows before bootstrap succeeds.
//! - A failure here is fatal for the process; it happens before the menu starts.

use std::path::PathBuf;
use thiserror::Error;

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, ConnectionError>;

/// Failure to obtain a usable connection to the store.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to open database `{}`: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to prepare database connection: {0}")]
    Bootstrap(#[from] rusqlite::Error),
    #[error("required table `{0}` is missing")]
    MissingRequiredTable(&'static str),
    #[error("required column `{table}.{column}` is missing")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}
