//! Common utilities for CLI E2E tests.

use std::path::Path;
use std::process::Command;

/// A throwaway data directory the CLI is pointed at via `HABITFLOW_DATA_DIR`.
pub struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Invoke a CLI command and return (stdout, stderr, exit code).
    pub fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_habitflow"))
            .args(args)
            .env("HABITFLOW_DATA_DIR", self.path())
            .env_remove("HABITFLOW_LOG")
            .output()
            .expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        (stdout, stderr, code)
    }

    /// Invoke a CLI command and expect success.
    pub fn run_success(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "CLI command {args:?} failed with code {code}: {stderr}");
        stdout
    }

    /// Invoke a CLI command and expect failure; returns stderr.
    pub fn run_failure(&self, args: &[&str]) -> String {
        let (_, stderr, code) = self.run(args);
        assert!(code != 0, "CLI command unexpectedly succeeded: {args:?}");
        stderr
    }

    /// Invoke a CLI command and parse its stdout as JSON.
    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout).expect("Failed to parse JSON output")
    }
}

/// Check if string contains substring
pub fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "Expected '{}' to contain '{}'",
        haystack,
        needle
    );
}
