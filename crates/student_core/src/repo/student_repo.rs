//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Map list/insert/update-email/delete onto single parameterized statements.
//! - Report whether a targeted row existed instead of treating a miss as failure.
//!
//! # Invariants
//! - Mutations are restricted to one `student_id`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::schema::verify_students_schema;
use crate::db::DbResult;
use crate::model::student::{NewStudent, Student, StudentId};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::ops::ControlFlow;
use thiserror::Error;

// No ORDER BY: rows come back in the store's natural order.
const STUDENT_SELECT_SQL: &str = "SELECT
    student_id,
    first_name,
    last_name,
    email,
    enrollment_date
FROM students";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a statement issued on an established connection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("invalid persisted student data: {0}")]
    InvalidData(String),
}

/// Result of a mutation that targets one row by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A row with the id existed and was changed.
    Applied,
    /// No row carries the id.
    NotFound,
}

impl WriteOutcome {
    /// More than one changed row cannot happen on a primary key; it counts as applied.
    pub fn from_changed_rows(changed: usize) -> Self {
        if changed == 0 {
            Self::NotFound
        } else {
            Self::Applied
        }
    }
}

/// Repository interface for student persistence.
pub trait StudentRepository {
    /// Streams rows to `visit` and returns how many were visited.
    ///
    /// Rows are decoded one at a time; nothing is buffered between calls.
    /// `ControlFlow::Break` stops the query before the remaining rows are read.
    fn for_each_student(
        &self,
        visit: &mut dyn FnMut(Student) -> ControlFlow<()>,
    ) -> StoreResult<usize>;
    /// Inserts one row; the store assigns `student_id`.
    fn insert_student(&self, student: &NewStudent) -> StoreResult<()>;
    fn update_email(&self, id: StudentId, email: &str) -> StoreResult<WriteOutcome>;
    fn delete_student(&self, id: StudentId) -> StoreResult<WriteOutcome>;
}

/// SQLite-backed student repository borrowing the process connection.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Wraps a connection after checking it exposes the `students` shape.
    pub fn try_new(conn: &'conn Connection) -> DbResult<Self> {
        verify_students_schema(conn)?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn for_each_student(
        &self,
        visit: &mut dyn FnMut(Student) -> ControlFlow<()>,
    ) -> StoreResult<usize> {
        let mut stmt = self.conn.prepare(STUDENT_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut visited = 0;

        while let Some(row) = rows.next()? {
            visited += 1;
            if visit(parse_student_row(row)?).is_break() {
                break;
            }
        }

        Ok(visited)
    }

    fn insert_student(&self, student: &NewStudent) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO students (
                first_name,
                last_name,
                email,
                enrollment_date
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                student.first_name.as_str(),
                student.last_name.as_str(),
                student.email.as_str(),
                student.enrollment_date,
            ],
        )?;
        Ok(())
    }

    fn update_email(&self, id: StudentId, email: &str) -> StoreResult<WriteOutcome> {
        let changed = self.conn.execute(
            "UPDATE students SET email = ?1 WHERE student_id = ?2;",
            params![email, id],
        )?;
        Ok(WriteOutcome::from_changed_rows(changed))
    }

    fn delete_student(&self, id: StudentId) -> StoreResult<WriteOutcome> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE student_id = ?1;", [id])?;
        Ok(WriteOutcome::from_changed_rows(changed))
    }
}

fn parse_student_row(row: &Row<'_>) -> StoreResult<Student> {
    let student_id: StudentId = row.get("student_id")?;
    let date_text: String = row.get("enrollment_date")?;
    let enrollment_date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d").map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid enrollment date `{date_text}` for student {student_id}"
        ))
    })?;

    Ok(Student {
        student_id,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        enrollment_date,
    })
}

#[cfg(test)]
mod tests {
    use super::WriteOutcome;

    #[test]
    fn changed_row_count_maps_to_outcome() {
        assert_eq!(WriteOutcome::from_changed_rows(0), WriteOutcome::NotFound);
        assert_eq!(WriteOutcome::from_changed_rows(1), WriteOutcome::Applied);
        assert_eq!(WriteOutcome::from_changed_rows(2), WriteOutcome::Applied);
    }
}
