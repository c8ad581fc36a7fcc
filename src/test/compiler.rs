//! Compiles raw test declarations into [`Test`] entities.
//!
//! Compilation is a fixed sequence of phases: name validation, name
//! normalization, schema validation against the original keys, then value
//! classification with defaults for the optional commands. Schema validation
//! runs before any defaulting so an absent optional command is never confused
//! with an invalid one.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::errors::CompileError;
use crate::test::commands::{self, describe, Command};
use crate::test::Test;

/// A word character followed by word characters, spaces and hyphens.
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w[\w -]*$").expect("name pattern is valid"));

/// The keys of one declaration after schema validation.
struct Declaration<'a> {
    run: &'a Value,
    stdout: &'a Value,
    optional: HashMap<Command, &'a Value>,
}

impl<'a> Declaration<'a> {
    fn get(&self, command: Command) -> Option<&'a Value> {
        self.optional.get(&command).copied()
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Compiles one named declaration into a [`Test`].
///
/// `raw` is the value found under the test's name in the document; it must
/// be a mapping of command keywords to values.
pub fn compile(name: &str, raw: &Value) -> Result<Test, CompileError> {
    if !NAME_PATTERN.is_match(name) {
        return Err(CompileError::InvalidName {
            name: name.to_string(),
        });
    }
    let name = normalize_name(name);

    let Value::Mapping(mapping) = raw else {
        return Err(CompileError::MalformedTest {
            found: describe(raw),
            test: name,
        });
    };

    let declaration = validate(&name, mapping)?;

    let test = Test {
        description: commands::description(declaration.get(Command::Description))?,
        run: commands::run(declaration.run)?,
        stdin: commands::stdin(declaration.get(Command::Stdin))?,
        stdout: commands::stdout(declaration.stdout)?,
        exit: commands::exit(declaration.get(Command::Exit))?,
        timeout: commands::timeout(declaration.get(Command::Timeout))?,
        shell: commands::shell(declaration.get(Command::Shell)),
        name,
    };
    tracing::debug!(test = %test.name, run = ?test.run, "compiled test");
    Ok(test)
}

/// Rewrites a validated name into identifier form.
///
/// Spaces and hyphens become underscores, and a leading digit (in any
/// script) gets an underscore prefix.
pub fn normalize_name(name: &str) -> String {
    let normalized = name.replace([' ', '-'], "_");
    if normalized.starts_with(char::is_numeric) {
        format!("_{normalized}")
    } else {
        normalized
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Checks every key against the supported set, then pulls out the required
/// commands in order.
fn validate<'a>(name: &str, mapping: &'a Mapping) -> Result<Declaration<'a>, CompileError> {
    let mut optional = HashMap::with_capacity(mapping.len());
    for (key, value) in mapping {
        let command = key
            .as_str()
            .and_then(Command::from_keyword)
            .ok_or_else(|| CompileError::UnsupportedCommand {
                test: name.to_string(),
                command: describe(key),
                supported: commands::supported_list(),
            })?;
        optional.insert(command, value);
    }

    let mut take = |command: Command| {
        optional
            .remove(&command)
            .ok_or_else(|| CompileError::MissingCommand {
                test: name.to_string(),
                command: command.to_string(),
            })
    };
    let run = take(Command::Run)?;
    let stdout = take(Command::Stdout)?;
    Ok(Declaration {
        run,
        stdout,
        optional,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(src: &str) -> Value {
        serde_yaml::from_str(src).expect("valid yaml")
    }

    #[test]
    fn minimal_declaration_gets_defaults() {
        let test = compile("greet", &decl("run: echo hi\nstdout: hi\\n")).unwrap();
        assert_eq!(test.name(), "greet");
        assert_eq!(test.run(), ["echo", "hi"]);
        assert_eq!(test.stdout(), "hi\\n");
        assert_eq!(test.description(), None);
        assert_eq!(test.stdin(), None);
        assert_eq!(test.exit(), 0);
        assert_eq!(test.timeout(), 2);
        assert!(!test.shell());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let raw = decl(
            "description: counts lines\nrun: wc -l\nstdin: \"a\\nb\\n\"\nstdout: '2'\nexit: 1\ntimeout: 9\nshell: true",
        );
        let test = compile("count", &raw).unwrap();
        assert_eq!(test.description(), Some("counts lines"));
        assert_eq!(test.stdin(), Some("a\nb\n"));
        assert_eq!(test.exit(), 1);
        assert_eq!(test.timeout(), 9);
        assert!(test.shell());
    }

    #[test]
    fn names_are_normalized() {
        let raw = decl("run: 'true'\nstdout: ''");
        assert_eq!(compile("my test-name", &raw).unwrap().name(), "my_test_name");
        assert_eq!(compile("2nd test", &raw).unwrap().name(), "_2nd_test");
        assert_eq!(compile("trailing-", &raw).unwrap().name(), "trailing_");
    }

    #[test]
    fn leading_digits_in_any_script_are_prefixed() {
        let raw = decl("run: 'true'\nstdout: ''");
        assert_eq!(compile("٣ test", &raw).unwrap().name(), "_٣_test");
        assert_eq!(normalize_name("٣"), "_٣");
    }

    #[test]
    fn names_must_start_with_a_word_character() {
        let raw = decl("run: 'true'\nstdout: ''");
        for bad in ["", "   ", "--", "a.b", "what?", "-lead", " lead"] {
            assert!(
                matches!(compile(bad, &raw), Err(CompileError::InvalidName { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_commands_are_rejected() {
        let err = compile("t", &decl("run: ls\nstdout: ''\nenv: x")).unwrap_err();
        match err {
            CompileError::UnsupportedCommand { command, test, .. } => {
                assert_eq!(command, "env");
                assert_eq!(test, "t");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unsupported_is_reported_before_missing() {
        let err = compile("t", &decl("bogus: 1")).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedCommand { .. }));
    }

    #[test]
    fn required_commands_must_be_present() {
        let err = compile("t", &decl("stdout: x")).unwrap_err();
        assert!(matches!(err, CompileError::MissingCommand { ref command, .. } if command == "run"));
        let err = compile("t", &decl("run: ls")).unwrap_err();
        assert!(matches!(err, CompileError::MissingCommand { ref command, .. } if command == "stdout"));
    }

    #[test]
    fn invalid_values_surface_as_invalid_argument() {
        let err = compile("t", &decl("run: ls\nstdout: ''\ntimeout: soon")).unwrap_err();
        assert_eq!(err.kind_name(), "InvalidArgument");
    }

    #[test]
    fn non_mapping_declarations_are_malformed() {
        let err = compile("t", &Value::Null).unwrap_err();
        assert!(matches!(err, CompileError::MalformedTest { .. }));
    }

    #[test]
    fn compilation_is_deterministic() {
        let raw = decl("run: echo a b\nstdout: a b\\n\nshell: 1");
        assert_eq!(compile("same", &raw).unwrap(), compile("same", &raw).unwrap());
    }
}
