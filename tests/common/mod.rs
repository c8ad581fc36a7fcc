//! Shared helpers for writing throwaway test documents.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// A test document written into its own temporary directory.
pub struct Suite {
    // Held so the directory outlives the test using it.
    _dir: TempDir,
    pub path: PathBuf,
}

/// Writes `body` under a `cmdspec.tests` header into `suite.yaml`.
///
/// `body` holds the declarations indented by four spaces, as they would sit
/// under `tests:`.
pub fn suite(body: &str) -> Suite {
    raw_document("suite.yaml", &format!("cmdspec:\n  tests:\n{body}"))
}

/// Writes `contents` verbatim to `file_name` in a fresh temporary directory.
pub fn raw_document(file_name: &str, contents: &str) -> Suite {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(file_name);
    fs::write(&path, contents).expect("write test document");
    Suite { _dir: dir, path }
}
