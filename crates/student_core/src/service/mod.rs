//! Core use-case services.
//!
//! # Responsibility
//! - Turn raw console values into repository calls.
//! - Keep the menu decoupled from storage details.

pub mod student_service;
