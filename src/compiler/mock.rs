/*!
 * Mock compiler implementation for testing.
 *
 * This module provides a mock compiler that simulates different behaviors:
 * - `MockCompiler::succeeding()` - Always exits with status zero
 * - `MockCompiler::failing()` - Always exits with a non-zero status
 * - `MockCompiler::intermittent(n)` - Fails every nth call
 * - `MockCompiler::unstartable()` - Cannot start at all
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::compiler::{CompileOutput, Compiler};
use crate::errors::CompileError;

/// Sample pdflatex chatter used as mock output
pub const SAMPLE_OUTPUT: &str = "This is pdfTeX, Version 3.141592653-2.6-1.40.25 (TeX Live 2023) (preloaded format=pdflatex)\n\
entering extended mode\n\
(./fragment.tex\n\
LaTeX2e <2022-11-01> patch level 1\n\
(/usr/share/texlive/texmf-dist/tex/latex/base/article.cls)\n\
[1] )\n\
Output written on fragment.pdf (1 page, 12345 bytes).\n\
Transcript written on fragment.log.\n";

/// Behavior mode for the mock compiler
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always exits with status zero
    Succeeding,
    /// Always exits with status one
    Failing,
    /// Fails every Nth call
    Intermittent { fail_every: usize },
    /// The process cannot be started
    Unstartable,
}

/// Mock compiler recording every fragment it is asked to compile
#[derive(Debug, Clone)]
pub struct MockCompiler {
    behavior: MockBehavior,
    output: String,
    call_count: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockCompiler {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            output: SAMPLE_OUTPUT.to_string(),
            call_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(MockBehavior::Succeeding)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn unstartable() -> Self {
        Self::new(MockBehavior::Unstartable)
    }

    /// Replace the canned compiler output
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Number of compile requests so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Fragments compiled so far, in call order
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().clone()
    }

    fn exited(&self, code: i32) -> CompileOutput {
        CompileOutput {
            success: code == 0,
            exit_code: Some(code),
            output: self.output.clone(),
        }
    }
}

impl Compiler for MockCompiler {
    fn compile(&self, fragment: &Path, _output_dir: &Path) -> Result<CompileOutput, CompileError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(fragment.to_path_buf());

        match self.behavior {
            MockBehavior::Succeeding => Ok(self.exited(0)),
            MockBehavior::Failing => Ok(self.exited(1)),
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Ok(self.exited(1))
                } else {
                    Ok(self.exited(0))
                }
            }
            MockBehavior::Unstartable => Err(CompileError::Spawn {
                command: "mock".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock compiler unavailable"),
            }),
        }
    }
}
