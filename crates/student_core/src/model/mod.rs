//! Domain model for the `students` relation.
//!
//! # Responsibility
//! - Define the student record and its insert-side counterpart.
//! - Own parsing of raw console text into typed values (ids, dates).
//!
//! # Invariants
//! - `student_id` is assigned by the store and never fabricated client-side.

pub mod student;
