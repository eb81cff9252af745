//! Student domain model and input parsing.
//!
//! # Responsibility
//! - Define `Student` (a persisted row) and `NewStudent` (insert payload).
//! - Parse enrollment dates and student ids from raw text.
//!
//! # Invariants
//! - Enrollment dates are accepted only in literal `YYYY-MM-DD` form.
//! - `NewStudent` carries no id; the store assigns one on insert.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store-generated primary key of a student row.
pub type StudentId = i64;

const ENROLLMENT_DATE_FORMAT: &str = "%Y-%m-%d";

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));

/// Raw console input that cannot be turned into the required shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInputError {
    #[error("invalid enrollment date `{0}`; expected YYYY-MM-DD")]
    MalformedDate(String),
    #[error("expected a whole number, got `{0}`")]
    NotAnInteger(String),
    #[error("input line is not valid UTF-8")]
    NotUtf8,
}

/// One row of the `students` relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Serialized as `YYYY-MM-DD`.
    pub enrollment_date: NaiveDate,
}

/// Insert payload for a student that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub enrollment_date: NaiveDate,
}

impl NewStudent {
    /// Builds an insert payload, parsing `enrollment_date` from console text.
    ///
    /// # Errors
    /// - `InvalidInputError::MalformedDate` when the date is not `YYYY-MM-DD`
    ///   or names a day that does not exist.
    pub fn parse(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        enrollment_date: &str,
    ) -> Result<Self, InvalidInputError> {
        Ok(Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            enrollment_date: parse_enrollment_date(enrollment_date)?,
        })
    }
}

/// Parses a literal `YYYY-MM-DD` date.
///
/// The shape is checked before calendar validation, so single-digit months,
/// other separators and surrounding whitespace are all rejected.
pub fn parse_enrollment_date(text: &str) -> Result<NaiveDate, InvalidInputError> {
    if !ISO_DATE_RE.is_match(text) {
        return Err(InvalidInputError::MalformedDate(text.to_string()));
    }
    NaiveDate::parse_from_str(text, ENROLLMENT_DATE_FORMAT)
        .map_err(|_| InvalidInputError::MalformedDate(text.to_string()))
}

/// Parses a student id typed at the console. Surrounding whitespace is ignored.
pub fn parse_student_id(text: &str) -> Result<StudentId, InvalidInputError> {
    let trimmed = text.trim();
    trimmed
        .parse::<StudentId>()
        .map_err(|_| InvalidInputError::NotAnInteger(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{parse_enrollment_date, parse_student_id, InvalidInputError, NewStudent};
    use chrono::NaiveDate;

    #[test]
    fn parses_literal_iso_date() {
        let date = parse_enrollment_date("1985-12-10").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1985, 12, 10).unwrap());
    }

    #[test]
    fn rejects_wrong_separators_and_garbage() {
        for text in ["2024/01/01", "not-a-date", "2024-1-1", " 2024-01-01", "", "20240101"] {
            assert_eq!(
                parse_enrollment_date(text),
                Err(InvalidInputError::MalformedDate(text.to_string())),
                "`{text}` should be rejected"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_month_and_day() {
        assert!(parse_enrollment_date("2024-13-01").is_err());
        assert!(parse_enrollment_date("2023-02-29").is_err());
        assert!(parse_enrollment_date("2024-04-31").is_err());
        assert!(parse_enrollment_date("2024-02-29").is_ok());
    }

    #[test]
    fn new_student_parse_carries_fields() {
        let student = NewStudent::parse("Ada", "Lovelace", "ada@example.com", "1985-12-10").unwrap();
        assert_eq!(student.first_name, "Ada");
        assert_eq!(student.last_name, "Lovelace");
        assert_eq!(student.email, "ada@example.com");
    }

    #[test]
    fn student_id_parsing_trims_and_rejects_non_numbers() {
        assert_eq!(parse_student_id(" 42 \n"), Ok(42));
        assert_eq!(
            parse_student_id("abc"),
            Err(InvalidInputError::NotAnInteger("abc".to_string()))
        );
        assert!(parse_student_id("4.5").is_err());
    }
}
