//! Interactive console loop.
//!
//! # Responsibility
//! - Read one selector per iteration and the fields that option needs.
//! - Dispatch to `StudentStore` and print each outcome.
//!
//! # Invariants
//! - Store and input failures are printed; they never end the loop.
//! - Malformed integers are rejected and the same value is asked for again.
//! - Selector `5` or end of input moves to `Terminated`; nothing more is read.

use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use student_core::{
    parse_student_id, InvalidInputError, Student, StudentError, StudentId, StudentRepository,
    StudentStore, WriteOutcome,
};

const SEPARATOR: &str = "--------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Running,
    Terminated,
}

/// Menu option chosen by a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    ListAll,
    Create,
    UpdateEmail,
    Delete,
    Exit,
}

impl Selection {
    pub fn from_selector(text: &str) -> Option<Self> {
        match text.trim().parse::<u8>().ok()? {
            1 => Some(Self::ListAll),
            2 => Some(Self::Create),
            3 => Some(Self::UpdateEmail),
            4 => Some(Self::Delete),
            5 => Some(Self::Exit),
            _ => None,
        }
    }
}

pub struct Menu<'store, R, In, Out>
where
    R: StudentRepository,
{
    store: &'store StudentStore<R>,
    input: In,
    output: Out,
    state: MenuState,
}

impl<'store, R, In, Out> Menu<'store, R, In, Out>
where
    R: StudentRepository,
    In: BufRead,
    Out: Write,
{
    pub fn new(store: &'store StudentStore<R>, input: In, output: Out) -> Self {
        Self {
            store,
            input,
            output,
            state: MenuState::Running,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Runs until exit is chosen or input ends.
    ///
    /// # Errors
    /// Only console I/O failures escape; store and input errors are printed.
    pub fn run(&mut self) -> io::Result<()> {
        while self.state == MenuState::Running {
            self.step()?;
        }
        Ok(())
    }

    /// Performs one iteration: banner, selector, dispatch.
    pub fn step(&mut self) -> io::Result<()> {
        self.print_banner()?;
        let line = match self.read_line()? {
            Some(Ok(line)) => line,
            Some(Err(err)) => return self.report_rejected_line(&err),
            None => return self.terminate(),
        };

        match Selection::from_selector(&line) {
            Some(Selection::ListAll) => self.list_all(),
            Some(Selection::Create) => self.create(),
            Some(Selection::UpdateEmail) => self.update_email(),
            Some(Selection::Delete) => self.delete(),
            Some(Selection::Exit) => {
                writeln!(self.output, "Exiting the program...Goodbye!")?;
                self.terminate()
            }
            None => {
                log::debug!("event=menu_select module=menu status=rejected");
                writeln!(self.output, "Invalid choice. Please try again.\n")
            }
        }
    }

    fn print_banner(&mut self) -> io::Result<()> {
        writeln!(self.output, "---- Student Management System ----")?;
        writeln!(self.output, "1. View All Students")?;
        writeln!(self.output, "2. Add a New Student")?;
        writeln!(self.output, "3. Update Student Email")?;
        writeln!(self.output, "4. Delete a Student")?;
        writeln!(self.output, "5. Exit")?;
        self.prompt("Enter your choice: ")
    }

    fn list_all(&mut self) -> io::Result<()> {
        writeln!(self.output, "--- Student List ---")?;
        let output = &mut self.output;
        let mut write_result: io::Result<()> = Ok(());
        let listed = self.store.for_each_student(|student| {
            match write_student(output, &student) {
                Ok(()) => ControlFlow::Continue(()),
                Err(err) => {
                    write_result = Err(err);
                    ControlFlow::Break(())
                }
            }
        });
        write_result?;

        match listed {
            Ok(0) => writeln!(self.output, "No students found."),
            Ok(_) => Ok(()),
            Err(err) => self.report_error(&err),
        }
    }

    fn create(&mut self) -> io::Result<()> {
        let Some(first_name) = self.ask("First Name: ")? else {
            return self.terminate();
        };
        let Some(last_name) = self.ask("Last Name: ")? else {
            return self.terminate();
        };
        let Some(email) = self.ask("Email: ")? else {
            return self.terminate();
        };
        let Some(enrollment_date) = self.ask("Enrollment Date (YYYY-MM-DD): ")? else {
            return self.terminate();
        };

        match self
            .store
            .create(&first_name, &last_name, &email, &enrollment_date)
        {
            Ok(()) => writeln!(self.output, "Student added successfully"),
            Err(err) => self.report_error(&err),
        }
    }

    fn update_email(&mut self) -> io::Result<()> {
        let Some(id) = self.ask_student_id("Student ID to update: ")? else {
            return self.terminate();
        };
        let Some(new_email) = self.ask("New Email: ")? else {
            return self.terminate();
        };

        match self.store.update_email(id, &new_email) {
            Ok(WriteOutcome::Applied) => {
                writeln!(self.output, "Student email updated successfully")
            }
            Ok(WriteOutcome::NotFound) => self.report_not_found(id),
            Err(err) => self.report_error(&err),
        }
    }

    fn delete(&mut self) -> io::Result<()> {
        let Some(id) = self.ask_student_id("Student ID to delete: ")? else {
            return self.terminate();
        };

        match self.store.delete(id) {
            Ok(WriteOutcome::Applied) => writeln!(self.output, "Student deleted successfully"),
            Ok(WriteOutcome::NotFound) => self.report_not_found(id),
            Err(err) => self.report_error(&err),
        }
    }

    /// Prompts until a readable line arrives. Returns `None` at end of input.
    fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        loop {
            self.prompt(label)?;
            match self.read_line()? {
                Some(Ok(line)) => return Ok(Some(line)),
                Some(Err(err)) => self.report_rejected_line(&err)?,
                None => return Ok(None),
            }
        }
    }

    fn ask_student_id(&mut self, label: &str) -> io::Result<Option<StudentId>> {
        loop {
            let Some(line) = self.ask(label)? else {
                return Ok(None);
            };
            match parse_student_id(&line) {
                Ok(id) => return Ok(Some(id)),
                Err(err) => self.report_rejected_line(&err)?,
            }
        }
    }

    fn prompt(&mut self, label: &str) -> io::Result<()> {
        write!(self.output, "{label}")?;
        self.output.flush()
    }

    /// Returns `None` at end of input. The line terminator is stripped.
    ///
    /// Bytes that are not UTF-8 come back as an input error so the caller can
    /// re-prompt; only failures of the stream itself are `Err`.
    fn read_line(&mut self) -> io::Result<Option<Result<String, InvalidInputError>>> {
        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        while matches!(raw.last(), Some(b'\n' | b'\r')) {
            raw.pop();
        }
        Ok(Some(
            String::from_utf8(raw).map_err(|_| InvalidInputError::NotUtf8),
        ))
    }

    fn report_rejected_line(&mut self, err: &InvalidInputError) -> io::Result<()> {
        log::debug!("event=menu_input module=menu status=rejected");
        writeln!(self.output, "Invalid input: {err}. Please try again.")
    }

    fn report_not_found(&mut self, id: StudentId) -> io::Result<()> {
        writeln!(self.output, "No student found with ID {id}")
    }

    fn report_error(&mut self, err: &StudentError) -> io::Result<()> {
        match err {
            StudentError::Input(err) => writeln!(self.output, "Invalid input: {err}"),
            StudentError::Store(err) => writeln!(self.output, "Database error: {err}"),
        }
    }

    fn terminate(&mut self) -> io::Result<()> {
        self.state = MenuState::Terminated;
        self.output.flush()
    }
}

fn write_student(output: &mut impl Write, student: &Student) -> io::Result<()> {
    writeln!(output, "Student ID: {}", student.student_id)?;
    writeln!(output, "First Name: {}", student.first_name)?;
    writeln!(output, "Last Name: {}", student.last_name)?;
    writeln!(output, "Email: {}", student.email)?;
    writeln!(output, "Enrollment Date: {}", student.enrollment_date)?;
    writeln!(output, "{SEPARATOR}")
}

#[cfg(test)]
mod tests {
    use super::{Menu, MenuState, Selection};
    use std::cell::Cell;
    use std::io::{self, Write};
    use std::ops::ControlFlow;
    use student_core::{
        open_db_in_memory, NewStudent, SqliteStudentRepository, StoreError, StoreResult, Student,
        StudentId, StudentRepository, StudentStore, WriteOutcome,
    };

    fn run_script<R: StudentRepository>(store: &StudentStore<R>, script: &str) -> (String, MenuState) {
        run_bytes(store, script.as_bytes())
    }

    fn run_bytes<R: StudentRepository>(store: &StudentStore<R>, script: &[u8]) -> (String, MenuState) {
        let mut output = Vec::new();
        let state = {
            let mut menu = Menu::new(store, script, &mut output);
            menu.run().unwrap();
            menu.state()
        };
        (String::from_utf8(output).unwrap(), state)
    }

    /// Counts rows the wrapped repository hands to the visitor.
    struct CountingRepository<R> {
        inner: R,
        handed_out: Cell<usize>,
    }

    impl<R: StudentRepository> StudentRepository for CountingRepository<R> {
        fn for_each_student(
            &self,
            visit: &mut dyn FnMut(Student) -> ControlFlow<()>,
        ) -> StoreResult<usize> {
            self.inner.for_each_student(&mut |student| {
                self.handed_out.set(self.handed_out.get() + 1);
                visit(student)
            })
        }

        fn insert_student(&self, student: &NewStudent) -> StoreResult<()> {
            self.inner.insert_student(student)
        }

        fn update_email(&self, id: StudentId, email: &str) -> StoreResult<WriteOutcome> {
            self.inner.update_email(id, email)
        }

        fn delete_student(&self, id: StudentId) -> StoreResult<WriteOutcome> {
            self.inner.delete_student(id)
        }
    }

    /// Console whose writes fail once a student record starts printing.
    struct BrokenListingConsole;

    impl Write for BrokenListingConsole {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.starts_with(b"Student ID") {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "console closed"));
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingRepository;

    impl StudentRepository for FailingRepository {
        fn for_each_student(
            &self,
            _visit: &mut dyn FnMut(Student) -> ControlFlow<()>,
        ) -> StoreResult<usize> {
            Err(StoreError::InvalidData("connection reset".to_string()))
        }

        fn insert_student(&self, _student: &NewStudent) -> StoreResult<()> {
            Err(StoreError::InvalidData("connection reset".to_string()))
        }

        fn update_email(&self, _id: StudentId, _email: &str) -> StoreResult<WriteOutcome> {
            Err(StoreError::InvalidData("connection reset".to_string()))
        }

        fn delete_student(&self, _id: StudentId) -> StoreResult<WriteOutcome> {
            Err(StoreError::InvalidData("connection reset".to_string()))
        }
    }

    #[test]
    fn selector_parsing_covers_the_five_options() {
        assert_eq!(Selection::from_selector("1"), Some(Selection::ListAll));
        assert_eq!(Selection::from_selector(" 2 "), Some(Selection::Create));
        assert_eq!(Selection::from_selector("3"), Some(Selection::UpdateEmail));
        assert_eq!(Selection::from_selector("4"), Some(Selection::Delete));
        assert_eq!(Selection::from_selector("5"), Some(Selection::Exit));
        assert_eq!(Selection::from_selector("6"), None);
        assert_eq!(Selection::from_selector("one"), None);
    }

    #[test]
    fn exit_terminates_without_reading_further_input() {
        let conn = open_db_in_memory().unwrap();
        let store = StudentStore::new(SqliteStudentRepository::try_new(&conn).unwrap());

        let (output, state) = run_script(&store, "5\n2\nAda\nLovelace\nada@example.com\n1985-12-10\n");

        assert_eq!(state, MenuState::Terminated);
        assert!(output.contains("Exiting the program...Goodbye!"));
        assert!(!output.contains("First Name: "));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn create_then_list_prints_the_new_student() {
        let conn = open_db_in_memory().unwrap();
        let store = StudentStore::new(SqliteStudentRepository::try_new(&conn).unwrap());

        let (output, _) = run_script(
            &store,
            "2\nAda\nLovelace\nada@example.com\n1985-12-10\n1\n5\n",
        );

        assert!(output.contains("Student added successfully"));
        assert!(output.contains("--- Student List ---"));
        assert!(output.contains("First Name: Ada"));
        assert!(output.contains("Email: ada@example.com"));
        assert!(output.contains("Enrollment Date: 1985-12-10"));
    }

    #[test]
    fn invalid_selector_and_malformed_date_keep_the_loop_running() {
        let conn = open_db_in_memory().unwrap();
        let store = StudentStore::new(SqliteStudentRepository::try_new(&conn).unwrap());

        let (output, state) = run_script(
            &store,
            "9\nabc\n2\nAda\nLovelace\nada@example.com\n2024/01/01\n5\n",
        );

        assert_eq!(output.matches("Invalid choice. Please try again.").count(), 2);
        assert!(output.contains("Invalid input: invalid enrollment date `2024/01/01`"));
        assert_eq!(state, MenuState::Terminated);
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn malformed_student_id_is_prompted_again() {
        let conn = open_db_in_memory().unwrap();
        let store = StudentStore::new(SqliteStudentRepository::try_new(&conn).unwrap());
        store
            .create("Ada", "Lovelace", "ada@example.com", "1985-12-10")
            .unwrap();
        let id = store.list_all().unwrap()[0].student_id;

        let (output, _) = run_script(&store, &format!("4\nfirst\n{id}\n5\n"));

        assert_eq!(output.matches("Student ID to delete: ").count(), 2);
        assert!(output.contains("Invalid input: expected a whole number, got `first`"));
        assert!(output.contains("Student deleted successfully"));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn update_and_delete_of_missing_id_report_not_found() {
        let conn = open_db_in_memory().unwrap();
        let store = StudentStore::new(SqliteStudentRepository::try_new(&conn).unwrap());

        let (output, _) = run_script(&store, "3\n77\nnobody@example.com\n4\n77\n5\n");

        assert_eq!(output.matches("No student found with ID 77").count(), 2);
    }

    #[test]
    fn store_failures_are_reported_and_the_loop_continues() {
        let store = StudentStore::new(FailingRepository);

        let (output, state) = run_script(
            &store,
            "1\n2\nAda\nLovelace\nada@example.com\n1985-12-10\n3\n1\nx@example.com\n4\n1\n5\n",
        );

        assert_eq!(output.matches("Database error:").count(), 4);
        assert!(output.contains("Exiting the program...Goodbye!"));
        assert_eq!(state, MenuState::Terminated);
    }

    #[test]
    fn non_utf8_lines_are_rejected_and_the_loop_continues() {
        let conn = open_db_in_memory().unwrap();
        let store = StudentStore::new(SqliteStudentRepository::try_new(&conn).unwrap());
        store
            .create("Ada", "Lovelace", "ada@example.com", "1985-12-10")
            .unwrap();

        let (output, state) = run_bytes(&store, b"\xff\xfe\n1\n5\n");

        assert_eq!(state, MenuState::Terminated);
        assert!(output.contains("Invalid input: input line is not valid UTF-8"));
        assert!(output.contains("--- Student List ---"));
        assert!(output.contains("First Name: Ada"));
        assert!(output.contains("Exiting the program...Goodbye!"));
    }

    #[test]
    fn non_utf8_field_is_asked_for_again() {
        let conn = open_db_in_memory().unwrap();
        let store = StudentStore::new(SqliteStudentRepository::try_new(&conn).unwrap());

        let (output, _) = run_bytes(
            &store,
            b"2\nAda\n\xc3\x28\nLovelace\nada@example.com\n1985-12-10\n5\n",
        );

        assert_eq!(output.matches("Last Name: ").count(), 2);
        assert!(output.contains("Student added successfully"));
        assert_eq!(store.list_all().unwrap()[0].last_name, "Lovelace");
    }

    #[test]
    fn console_failure_during_listing_stops_the_query() {
        let conn = open_db_in_memory().unwrap();
        let store = StudentStore::new(CountingRepository {
            inner: SqliteStudentRepository::try_new(&conn).unwrap(),
            handed_out: Cell::new(0),
        });
        for email in ["ada@example.com", "alan@example.com", "grace@example.com"] {
            store.create("Student", "Pioneer", email, "1950-01-01").unwrap();
        }
        store.list_all().unwrap();
        let after_full_listing = store_handed_out(&store);
        assert_eq!(after_full_listing, 3);

        let mut menu = Menu::new(&store, &b"1\n5\n"[..], BrokenListingConsole);
        let err = menu.run().unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(store_handed_out(&store) - after_full_listing, 1);
    }

    fn store_handed_out<R: StudentRepository>(store: &StudentStore<CountingRepository<R>>) -> usize {
        store.repository().handed_out.get()
    }

    #[test]
    fn end_of_input_terminates_mid_prompt() {
        let conn = open_db_in_memory().unwrap();
        let store = StudentStore::new(SqliteStudentRepository::try_new(&conn).unwrap());

        let (output, state) = run_script(&store, "2\nAda\n");

        assert_eq!(state, MenuState::Terminated);
        assert!(output.ends_with("Last Name: "));
        assert!(store.list_all().unwrap().is_empty());
    }
}
