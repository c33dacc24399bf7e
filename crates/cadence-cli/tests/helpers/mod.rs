use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test harness for running CLI commands with temporary databases
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with a temporary database
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self { temp_dir, db_path }
    }

    /// Get a Command instance configured for testing. It runs inside the
    /// temporary directory so a stray `cadence.toml` is never picked up.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("cadence").expect("Failed to find cadence binary");
        cmd.current_dir(self.temp_dir.path())
            .env_remove("CADENCE_LOG")
            .env_remove("CADENCE_DEFAULT_ON_WEEKEND")
            .env_remove("CADENCE_PREVIEW_COUNT")
            .env("CADENCE_DATABASE_PATH", &self.db_path);
        cmd
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Runs `add` and returns the short ID it reports.
    pub fn add_task(&self, args: &[&str]) -> String {
        let mut full = vec!["add"];
        full.extend_from_slice(args);
        let output = self.run_success(&full).get_output().stdout.clone();
        let stdout = strip_ansi(&String::from_utf8_lossy(&output));
        stdout
            .lines()
            .find_map(|line| line.split("Task ID: ").nth(1))
            .map(|id| id.trim().to_string())
            .expect("add did not report a task ID")
    }

    /// Runs a command and returns its stdout without color codes.
    pub fn stdout(&self, args: &[&str]) -> String {
        let output = self.run_success(args).get_output().stdout.clone();
        strip_ansi(&String::from_utf8_lossy(&output))
    }
}

/// Removes ANSI color sequences from terminal output.
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            // Skip until the final byte of the escape sequence.
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    /// Predicate to check if output contains task table headers
    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Name"))
            .and(predicate::str::contains("Status"))
    }

    /// Predicate to check if output indicates successful task creation
    pub fn task_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("✓").and(predicate::str::contains("Created"))
    }

    /// Predicate to check for empty result set
    pub fn empty_result() -> impl Predicate<str> {
        predicate::str::contains("No tasks found")
    }

    /// Predicate to check for error messages
    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
