//! Reads a test document and compiles its declarations.
//!
//! A test document is a YAML file shaped like:
//!
//! ```yaml
//! cmdspec:
//!   tests:
//!     echo works:
//!       run: echo hi
//!       stdout: hi\n
//! ```
//!
//! The loader checks the extension before touching the file, checks the
//! top-level shape after parsing, and then hands each entry to the compiler in
//! document order, failing fast on the first invalid declaration.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::errors::CompileError;
use crate::test::compiler::{compile, normalize_name};
use crate::test::Test;

/// Top-level key every test document must carry.
pub const APPLICATION_KEY: &str = "cmdspec";
/// Key under [`APPLICATION_KEY`] holding the test declarations.
pub const TEST_CONTAINER: &str = "tests";
/// File loaded when no filename is given on the command line.
pub const DEFAULT_FILENAME: &str = "tests.yaml";

const YAML_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Compiles the tests in `path`, or only `target` when given.
///
/// Returns `Ok(None)` when nothing was compiled, including when `target`
/// names no test in the document. Callers treat that as fatal.
pub fn load(path: &Path, target: Option<&str>) -> Result<Option<Vec<Test>>, CompileError> {
    let container = read(path)?;

    let tests = match target {
        Some(target) => match find_target(&container, target) {
            Some((name, raw)) => vec![compile(&name, raw)?],
            None => {
                tracing::debug!(requested = target, "target not found in {}", path.display());
                Vec::new()
            }
        },
        None => container
            .iter()
            .map(|(key, raw)| compile(&test_name(path, key)?, raw))
            .collect::<Result<Vec<_>, _>>()?,
    };

    tracing::debug!(count = tests.len(), "loaded tests from {}", path.display());
    Ok(if tests.is_empty() { None } else { Some(tests) })
}

/// Reads `path` and returns its test container mapping.
pub fn read(path: &Path) -> Result<Mapping, CompileError> {
    let display = path.display().to_string();

    if !has_yaml_extension(path) {
        return Err(CompileError::InvalidFile {
            path: display,
            reason: "YAML file".to_string(),
        });
    }

    let source = fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: display.clone(),
        source,
    })?;
    let document: Value = serde_yaml::from_str(&source).map_err(|source| CompileError::Yaml {
        path: display.clone(),
        source,
    })?;

    match container(&document) {
        Some(tests) => Ok(tests.clone()),
        None => Err(CompileError::InvalidFile {
            path: display,
            reason: format!("{APPLICATION_KEY} file"),
        }),
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn has_yaml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| YAML_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// The non-empty `cmdspec.tests` mapping, if the document has one.
fn container(document: &Value) -> Option<&Mapping> {
    document
        .get(APPLICATION_KEY)
        .and_then(|app| app.get(TEST_CONTAINER))
        .and_then(Value::as_mapping)
        .filter(|tests| !tests.is_empty())
}

/// Scalar keys become test names; anything else makes the file invalid.
fn test_name(path: &Path, key: &Value) -> Result<String, CompileError> {
    scalar_name(key).ok_or_else(|| CompileError::InvalidFile {
        path: path.display().to_string(),
        reason: format!("{APPLICATION_KEY} file: test names must be scalars"),
    })
}

fn scalar_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Looks `target` up by raw key, then by normalized name.
fn find_target<'a>(container: &'a Mapping, target: &str) -> Option<(String, &'a Value)> {
    let named: Vec<(String, &Value)> = container
        .iter()
        .filter_map(|(key, raw)| scalar_name(key).map(|name| (name, raw)))
        .collect();

    if let Some((name, raw)) = named.iter().find(|(name, _)| name == target) {
        return Some((name.clone(), *raw));
    }
    let wanted = normalize_name(target);
    named
        .into_iter()
        .find(|(name, _)| normalize_name(name) == wanted)
}
