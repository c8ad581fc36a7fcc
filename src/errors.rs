//! Compile-time error taxonomy for cmdspec.
//!
//! Every failure that happens before a test runs is a `CompileError`. They are
//! all fatal: the loader fails fast and no partial test set is executed.
//! Failures that happen while a test runs are not errors at all; they are
//! captured as `Outcome` variants by the executor.

use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

// ============================================================================
// ERROR CATEGORIES
// ============================================================================

/// Coarse grouping of compile errors, mirroring the pipeline phase that
/// raised them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The source document could not be read or is not a test file.
    Read,
    /// A test declaration violates the command schema.
    Validate,
    /// A test name or command value has the wrong shape.
    Parse,
    /// The document compiled, but produced nothing to run.
    Load,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Read => "ReadError",
            ErrorCategory::Validate => "ValidateError",
            ErrorCategory::Parse => "ParseError",
            ErrorCategory::Load => "LoadError",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// COMPILE ERROR
// ============================================================================

/// Unified error type for loading and compiling a test document.
#[derive(Debug, Error, Diagnostic)]
pub enum CompileError {
    #[error("{path} is not a valid {reason}.")]
    #[diagnostic(
        code(cmdspec::read::invalid_file),
        help("test files are YAML documents with a top-level `cmdspec.tests` mapping")
    )]
    InvalidFile { path: String, reason: String },

    #[error("failed to read {path}")]
    #[diagnostic(code(cmdspec::read::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path} as YAML")]
    #[diagnostic(code(cmdspec::read::yaml))]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{command} is not a valid command in test {test}, use only: {supported}")]
    #[diagnostic(code(cmdspec::validate::unsupported_command))]
    UnsupportedCommand {
        test: String,
        command: String,
        supported: String,
    },

    #[error("Missing {command} in test {test}")]
    #[diagnostic(code(cmdspec::validate::missing_command))]
    MissingCommand { test: String, command: String },

    #[error("test {test} must be a mapping of commands, found {found}")]
    #[diagnostic(code(cmdspec::validate::malformed_test))]
    MalformedTest { test: String, found: String },

    #[error("{name} is not a valid name for a test; test names should consist only of alphanumeric characters, underscores, hyphens, and spaces")]
    #[diagnostic(code(cmdspec::parse::invalid_name))]
    InvalidName { name: String },

    #[error("{command} command only accepts {expected}, not {found}")]
    #[diagnostic(code(cmdspec::parse::invalid_argument))]
    InvalidArgument {
        command: String,
        expected: String,
        found: String,
    },

    #[error("No tests compiled{}", target_suffix(.target))]
    #[diagnostic(
        code(cmdspec::load::no_tests),
        help("check the --target name against the keys under `cmdspec.tests`")
    )]
    NoTests { target: Option<String> },
}

impl CompileError {
    /// The pipeline phase this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CompileError::InvalidFile { .. } | CompileError::Io { .. } | CompileError::Yaml { .. } => {
                ErrorCategory::Read
            }
            CompileError::UnsupportedCommand { .. }
            | CompileError::MissingCommand { .. }
            | CompileError::MalformedTest { .. } => ErrorCategory::Validate,
            CompileError::InvalidName { .. } | CompileError::InvalidArgument { .. } => {
                ErrorCategory::Parse
            }
            CompileError::NoTests { .. } => ErrorCategory::Load,
        }
    }

    /// The most specific kind name, as shown to the user in non-verbose mode.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CompileError::InvalidFile { .. } => "InvalidFile",
            CompileError::UnsupportedCommand { .. } => "UnsupportedCommand",
            CompileError::MissingCommand { .. } => "MissingCommand",
            CompileError::InvalidArgument { .. } => "InvalidArgument",
            // These have no finer-grained kind than their category.
            CompileError::Io { .. }
            | CompileError::Yaml { .. }
            | CompileError::MalformedTest { .. }
            | CompileError::InvalidName { .. }
            | CompileError::NoTests { .. } => self.category().as_str(),
        }
    }

    pub(crate) fn invalid_argument(
        command: impl Into<String>,
        expected: impl Into<String>,
        found: impl fmt::Display,
    ) -> Self {
        CompileError::InvalidArgument {
            command: command.into(),
            expected: expected.into(),
            found: found.to_string(),
        }
    }
}

fn target_suffix(target: &Option<String>) -> String {
    match target {
        Some(target) => format!(" with target {target}"),
        None => String::new(),
    }
}
