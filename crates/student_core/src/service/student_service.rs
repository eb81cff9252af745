//! Student use-case service.
//!
//! # Responsibility
//! - Expose list, create, update-email and delete as explicit result values.
//! - Parse create input before any statement reaches the store.
//!
//! # Invariants
//! - Malformed input never reaches the repository.
//! - Each operation issues at most one statement and never retries.
//! - Log lines carry ids and counts, never names or emails.

use crate::model::student::{InvalidInputError, NewStudent, Student, StudentId};
use crate::repo::student_repo::{StoreError, StudentRepository, WriteOutcome};
use log::{error, info, warn};
use std::ops::ControlFlow;
use std::time::Instant;
use thiserror::Error;

pub type StudentResult<T> = Result<T, StudentError>;

/// Why a student operation was abandoned.
#[derive(Debug, Error)]
pub enum StudentError {
    #[error(transparent)]
    Input(#[from] InvalidInputError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Use-case entry point owning the repository for the process lifetime.
pub struct StudentStore<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> StudentStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Streams students to `visit` in the store's natural order.
    ///
    /// Each call runs a fresh query, so the sequence can be restarted by
    /// calling again. A `Break` from `visit` ends the query early. Returns the
    /// number of students visited.
    pub fn for_each_student<F>(&self, mut visit: F) -> StudentResult<usize>
    where
        F: FnMut(Student) -> ControlFlow<()>,
    {
        let started_at = Instant::now();
        match self.repo.for_each_student(&mut visit) {
            Ok(count) => {
                info!(
                    "event=student_list module=service status=ok count={} duration_ms={}",
                    count,
                    started_at.elapsed().as_millis()
                );
                Ok(count)
            }
            Err(err) => Err(self.store_failure("student_list", started_at, err)),
        }
    }

    /// Collects every student into memory.
    pub fn list_all(&self) -> StudentResult<Vec<Student>> {
        let mut students = Vec::new();
        self.for_each_student(|student| {
            students.push(student);
            ControlFlow::Continue(())
        })?;
        Ok(students)
    }

    /// Creates a student from console text.
    ///
    /// # Contract
    /// - `enrollment_date` must be literal `YYYY-MM-DD`; otherwise
    ///   `StudentError::Input` is returned and nothing is inserted.
    /// - The assigned id is not reported; list to discover it.
    pub fn create(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        enrollment_date: &str,
    ) -> StudentResult<()> {
        let started_at = Instant::now();
        let student = NewStudent::parse(first_name, last_name, email, enrollment_date)
            .map_err(|err| {
                warn!("event=student_create module=service status=rejected error_code=invalid_date");
                err
            })?;

        match self.repo.insert_student(&student) {
            Ok(()) => {
                info!(
                    "event=student_create module=service status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => Err(self.store_failure("student_create", started_at, err)),
        }
    }

    /// Replaces the email of one student. The new value is not validated.
    pub fn update_email(&self, id: StudentId, new_email: &str) -> StudentResult<WriteOutcome> {
        let started_at = Instant::now();
        match self.repo.update_email(id, new_email) {
            Ok(outcome) => Ok(self.log_write("student_update_email", id, outcome, started_at)),
            Err(err) => Err(self.store_failure("student_update_email", started_at, err)),
        }
    }

    /// Deletes one student by id.
    pub fn delete(&self, id: StudentId) -> StudentResult<WriteOutcome> {
        let started_at = Instant::now();
        match self.repo.delete_student(id) {
            Ok(outcome) => Ok(self.log_write("student_delete", id, outcome, started_at)),
            Err(err) => Err(self.store_failure("student_delete", started_at, err)),
        }
    }

    fn log_write(
        &self,
        event: &str,
        id: StudentId,
        outcome: WriteOutcome,
        started_at: Instant,
    ) -> WriteOutcome {
        let status = match outcome {
            WriteOutcome::Applied => "ok",
            WriteOutcome::NotFound => "not_found",
        };
        info!(
            "event={} module=service status={} student_id={} duration_ms={}",
            event,
            status,
            id,
            started_at.elapsed().as_millis()
        );
        outcome
    }

    fn store_failure(&self, event: &str, started_at: Instant, err: StoreError) -> StudentError {
        error!(
            "event={} module=service status=error duration_ms={} error_code=store_failed error={}",
            event,
            started_at.elapsed().as_millis(),
            err
        );
        StudentError::Store(err)
    }
}
