//! `students` relation definition and shape checks.
//!
//! Bootstrap is a single idempotent `CREATE TABLE IF NOT EXISTS`; there is no
//! versioned migration history.

use super::{ConnectionError, DbResult};
use rusqlite::{Connection, OptionalExtension};

pub const STUDENTS_TABLE: &str = "students";

/// Columns every `students` table must expose, in select order.
pub const STUDENT_COLUMNS: [&str; 5] = [
    "student_id",
    "first_name",
    "last_name",
    "email",
    "enrollment_date",
];

// AUTOINCREMENT keeps deleted ids from being handed out again.
const STUDENTS_DDL: &str = "CREATE TABLE IF NOT EXISTS students (
    student_id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL CHECK (length(first_name) > 0),
    last_name TEXT NOT NULL CHECK (length(last_name) > 0),
    email TEXT NOT NULL UNIQUE,
    enrollment_date TEXT NOT NULL
);";

/// Creates the `students` table when it does not exist.
pub fn ensure_students_table(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(STUDENTS_DDL)?;
    Ok(())
}

/// Checks that `students` exists and carries every required column.
///
/// # Errors
/// - `MissingRequiredTable` when the table is absent.
/// - `MissingRequiredColumn` naming the first absent column.
pub fn verify_students_schema(conn: &Connection) -> DbResult<()> {
    let table: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [STUDENTS_TABLE],
            |row| row.get(0),
        )
        .optional()?;
    if table.is_none() {
        return Err(ConnectionError::MissingRequiredTable(STUDENTS_TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({STUDENTS_TABLE});"))?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;

    for column in STUDENT_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(ConnectionError::MissingRequiredColumn {
                table: STUDENTS_TABLE,
                column,
            });
        }
    }

    Ok(())
}
