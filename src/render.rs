//! Formats test results for the terminal.
//!
//! Rendering happens once, after every test has run. The report is built in a
//! `termcolor` buffer so the same code produces colored or plain text.

use std::io::{self, Write};

use difference::{Changeset, Difference};
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::test::executor::Outcome;
use crate::test::result::TestResult;

const LOG_INDENT: &str = "      ";

/// Tally of verdicts across a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl Summary {
    pub fn of(results: &[TestResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            match result.passed {
                Some(true) => summary.passed += 1,
                Some(false) => summary.failed += 1,
                None => summary.errored += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }
}

/// Renders every result, plus its raw log when `log` is set, followed by a
/// summary line.
pub fn render(results: &[TestResult], log: bool, use_colors: bool) -> String {
    let mut buffer = if use_colors {
        Buffer::ansi()
    } else {
        Buffer::no_color()
    };
    // Writes into an in-memory buffer cannot fail.
    let _ = write_report(&mut buffer, results, log);
    String::from_utf8_lossy(buffer.as_slice()).into_owned()
}

fn write_report(out: &mut Buffer, results: &[TestResult], log: bool) -> io::Result<()> {
    for result in results {
        write_result(out, result)?;
        if log {
            write_log(out, result)?;
        }
    }

    let summary = Summary::of(results);
    writeln!(out)?;
    write!(out, "{} tests: ", summary.total())?;
    write_colored(out, Color::Green, &format!("{} passed", summary.passed))?;
    write!(out, ", ")?;
    write_colored(out, Color::Red, &format!("{} failed", summary.failed))?;
    write!(out, ", ")?;
    write_colored(out, Color::Yellow, &format!("{} errored", summary.errored))?;
    Ok(())
}

fn write_result(out: &mut Buffer, result: &TestResult) -> io::Result<()> {
    let (tag, color) = match result.passed {
        Some(true) => ("PASS ", Color::Green),
        Some(false) => ("FAIL ", Color::Red),
        None => ("ERROR", Color::Yellow),
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{tag}")?;
    out.reset()?;
    write!(out, " {}", result.name)?;
    if let Some(description) = &result.description {
        write!(out, " ({description})")?;
    }
    writeln!(out, ": {}", result.cause)
}

fn write_log(out: &mut Buffer, result: &TestResult) -> io::Result<()> {
    match &result.log {
        Outcome::Completed {
            stdout,
            stderr,
            exit_code,
        }
        | Outcome::ProcessError {
            stdout,
            stderr,
            exit_code,
        } => {
            writeln!(out, "{LOG_INDENT}stdout:    {stdout}")?;
            writeln!(out, "{LOG_INDENT}stderr:    {stderr}")?;
            match exit_code {
                Some(code) => writeln!(out, "{LOG_INDENT}exit code: {code}")?,
                None => writeln!(out, "{LOG_INDENT}exit code: none")?,
            }
            if result.passed == Some(false) && *stdout != result.expected {
                write!(out, "{LOG_INDENT}diff:      ")?;
                write_diff(out, &result.expected, stdout)?;
                writeln!(out)?;
            }
        }
        Outcome::TimedOut { timeout_secs } => {
            writeln!(out, "{LOG_INDENT}timeout:   {timeout_secs} seconds")?;
        }
    }
    Ok(())
}

/// Word-level diff of expected against actual output.
fn write_diff(out: &mut Buffer, expected: &str, actual: &str) -> io::Result<()> {
    let changeset = Changeset::new(expected, actual, " ");
    for (i, diff) in changeset.diffs.iter().enumerate() {
        if i > 0 {
            write!(out, " ")?;
        }
        match diff {
            Difference::Same(text) => write!(out, "{text}")?,
            Difference::Rem(text) => write_colored(out, Color::Red, &format!("[-{text}-]"))?,
            Difference::Add(text) => write_colored(out, Color::Green, &format!("{{+{text}+}}"))?,
        }
    }
    Ok(())
}

fn write_colored(out: &mut Buffer, color: Color, text: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(out, "{text}")?;
    out.reset()
}
