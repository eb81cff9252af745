//! Core student management logic.
//! This crate owns the `students` relation: storage bootstrap, parsing, and
//! the four store operations the console front-end dispatches to.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::AppConfig;
pub use db::{open_db, open_db_in_memory, ConnectionError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::student::{
    parse_enrollment_date, parse_student_id, InvalidInputError, NewStudent, Student, StudentId,
};
pub use repo::student_repo::{
    SqliteStudentRepository, StoreError, StoreResult, StudentRepository, WriteOutcome,
};
pub use service::student_service::{StudentError, StudentResult, StudentStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
