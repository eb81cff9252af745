//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for the `students` relation.
//! - Isolate SQLite query details from the use-case layer.
//!
//! # Invariants
//! - Every statement is parameterized; user text is never spliced into SQL.
//! - Each repository call issues exactly one statement.

pub mod student_repo;
