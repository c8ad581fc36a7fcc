pub use crate::errors::{CompileError, ErrorCategory};
pub use crate::test::executor::Outcome;
pub use crate::test::result::TestResult;
pub use crate::test::Test;

pub mod cli;
pub mod errors;
pub mod loader;
pub mod render;
