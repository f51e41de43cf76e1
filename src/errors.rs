/*!
 * Error types for the latex-autosplit application.
 *
 * This module contains custom error types for the different stages of a run
 * (loading, resolving, scanning, compiling), using the thiserror crate for
 * ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing a document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file exists but could not be read
    #[error("Failed to read {path:?}: {source}")]
    Read {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The file could not be written
    #[error("Failed to write {path:?}: {source}")]
    Write {
        /// Path that was being written
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },
}

/// Errors that can occur while inlining included files
#[derive(Error, Debug)]
pub enum ResolveError {
    /// A file includes itself, directly or through other files
    #[error("Circular inclusion of {path:?} (include chain: {})", format_chain(.chain))]
    CircularInclusion {
        /// The file that was about to be expanded a second time
        path: PathBuf,
        /// Files being expanded when the cycle was found, outermost first
        chain: Vec<PathBuf>,
    },

    /// An included file could not be read
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors raised by the scan mode stack
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScanError {
    /// Attempted to pop the bottom state of the stack
    #[error("Cannot leave {state}: it is the outermost scan state")]
    StackUnderflow {
        /// The state that would have been removed
        state: String,
    },
}

/// Errors that can occur when invoking the external compiler
#[derive(Error, Debug)]
pub enum CompileError {
    /// The compiler process could not be started
    #[error("Failed to run compiler command '{command}': {source}")]
    Spawn {
        /// The shell command template
        command: String,
        /// Underlying I/O failure
        source: std::io::Error,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error while loading or saving a document
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error while resolving includes
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Error while scanning the document
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
