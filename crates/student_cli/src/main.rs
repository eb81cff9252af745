//! Console entry point for the student manager.
//!
//! # Responsibility
//! - Resolve configuration, start logging, and open the single connection.
//! - Hand the connection to the menu and release it on every exit path.
//!
//! Exit code is non-zero only when startup fails or the console breaks.

mod menu;

use log::{error, info, warn};
use menu::Menu;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use student_core::{
    core_version, init_logging, open_db, AppConfig, SqliteStudentRepository, StudentStore,
};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunOutcome {
    Finished,
    /// The store could not be opened; the console was never read.
    StartupFailed,
    ConsoleFailed,
}

impl RunOutcome {
    fn exit_code(self) -> ExitCode {
        match self {
            Self::Finished => ExitCode::SUCCESS,
            Self::StartupFailed | Self::ConsoleFailed => ExitCode::FAILURE,
        }
    }
}

fn main() -> ExitCode {
    let config = match AppConfig::from_current_dir() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to resolve working directory: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }
    info!("event=cli_start module=cli status=ok version={}", core_version());

    let stdin = io::stdin();
    let stdout = io::stdout();
    run(&config, stdin.lock(), stdout.lock()).exit_code()
}

/// Opens the store named by `config` and drives the menu over `input`.
///
/// The connection is closed before returning on every path after it opened.
fn run(config: &AppConfig, input: impl BufRead, mut output: impl Write) -> RunOutcome {
    let conn = match open_db(&config.database_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("Failed to connect to the database: {err}");
            return RunOutcome::StartupFailed;
        }
    };

    let session = {
        let repo = match SqliteStudentRepository::try_new(&conn) {
            Ok(repo) => repo,
            Err(err) => {
                eprintln!("Failed to connect to the database: {err}");
                return RunOutcome::StartupFailed;
            }
        };
        if let Err(err) = writeln!(output, "Successfully connected to the database") {
            error!("event=cli_exit module=cli status=error error_code=console_io error={err}");
            return RunOutcome::ConsoleFailed;
        }

        let store = StudentStore::new(repo);
        let mut menu = Menu::new(&store, input, output);
        let result = menu.run();
        info!("event=menu_exit module=cli final_state={:?}", menu.state());
        result
    };

    if let Err((_, err)) = conn.close() {
        warn!("event=db_close module=cli status=error error={err}");
    }

    match session {
        Ok(()) => {
            info!("event=cli_exit module=cli status=ok");
            RunOutcome::Finished
        }
        Err(err) => {
            error!("event=cli_exit module=cli status=error error_code=console_io error={err}");
            eprintln!("Console error: {err}");
            RunOutcome::ConsoleFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{run, RunOutcome};
    use student_core::{open_db, AppConfig, SqliteStudentRepository, StudentStore};

    #[test]
    fn unreachable_store_fails_startup_without_reading_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::in_dir(dir.path());
        config.database_path = dir.path().join("missing").join("nested").join("students.db");
        let script = b"2\nAda\nLovelace\nada@example.com\n1985-12-10\n5\n";
        let mut input = &script[..];
        let mut output = Vec::new();

        let outcome = run(&config, &mut input, &mut output);

        assert_eq!(outcome, RunOutcome::StartupFailed);
        assert_eq!(input.len(), script.len());
        assert!(output.is_empty());
    }

    #[test]
    fn session_runs_to_exit_and_persists_rows() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::in_dir(dir.path());
        let mut output = Vec::new();

        let outcome = run(
            &config,
            &b"2\nAda\nLovelace\nada@example.com\n1985-12-10\n5\n"[..],
            &mut output,
        );

        assert_eq!(outcome, RunOutcome::Finished);
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Successfully connected to the database"));
        assert!(output.contains("Exiting the program...Goodbye!"));

        let conn = open_db(&config.database_path).unwrap();
        let store = StudentStore::new(SqliteStudentRepository::try_new(&conn).unwrap());
        assert_eq!(store.list_all().unwrap()[0].email, "ada@example.com");
    }
}
