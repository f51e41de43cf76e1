/*!
 * External compiler invocation.
 *
 * This module contains the implementations used to compile fragments:
 * - `shell`: runs a configurable shell command (pdflatex by default)
 * - `mock`: scripted compiler for tests
 */

use std::fmt::Debug;
use std::path::Path;

use crate::errors::CompileError;

/// Result of compiling one fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    /// Whether the compiler exited with status zero
    pub success: bool,
    /// Exit code, if the process was not killed by a signal
    pub exit_code: Option<i32>,
    /// Captured stdout followed by stderr
    pub output: String,
}

/// Common trait for all compilers
///
/// Compilation is blocking; the caller waits for each fragment before
/// moving on to the next one.
pub trait Compiler: Debug {
    /// Compile `fragment`, writing artifacts into `output_dir`
    ///
    /// # Arguments
    /// * `fragment` - Path of the fragment source
    /// * `output_dir` - Directory for the compiler's output files
    ///
    /// # Returns
    /// * `Result<CompileOutput, CompileError>` - The captured run, or an error if the process could not start
    fn compile(&self, fragment: &Path, output_dir: &Path) -> Result<CompileOutput, CompileError>;
}

pub mod mock;
pub mod shell;

pub use self::mock::{MockBehavior, MockCompiler};
pub use self::shell::ShellCompiler;
