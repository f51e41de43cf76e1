use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{Document, TEX_EXTENSION};
use crate::splitter::FragmentKind;

// @module: File and directory utilities

/// File name of the flattened copy of the input
pub const FLATTENED_FILE_NAME: &str = "flattened.tex";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Path of the numbered fragment of a kind
    pub fn fragment_path<P: AsRef<Path>>(output_dir: P, kind: FragmentKind, index: usize) -> PathBuf {
        output_dir
            .as_ref()
            .join(format!("{}{}.{}", kind.file_prefix(), index, TEX_EXTENSION))
    }

    // @generates: Path of the flattened document
    pub fn flattened_path<P: AsRef<Path>>(output_dir: P) -> PathBuf {
        output_dir.as_ref().join(FLATTENED_FILE_NAME)
    }

    /// Write `document` unless the file already holds exactly this content.
    ///
    /// Returns whether a write happened.
    pub fn write_if_changed<P: AsRef<Path>>(path: P, document: &Document) -> Result<bool> {
        let path = path.as_ref();
        if Self::file_exists(path) {
            // Unreadable files count as changed and get rewritten
            if let Ok(current) = fs::read_to_string(path) {
                if current == document.as_str() {
                    debug!("Unchanged: {:?}", path);
                    return Ok(false);
                }
            }
        }

        document
            .save(path)
            .with_context(|| format!("Failed to write fragment: {:?}", path))?;
        Ok(true)
    }

    /// Index of a fragment file of `kind`, parsed from its file name
    pub fn fragment_index<P: AsRef<Path>>(path: P, kind: FragmentKind) -> Option<usize> {
        let name = path.as_ref().file_name()?.to_str()?;
        let number = name
            .strip_prefix(kind.file_prefix())?
            .strip_suffix(TEX_EXTENSION)?
            .strip_suffix('.')?;
        number.parse().ok()
    }

    /// Delete fragments of `kind` numbered `keep` or higher.
    ///
    /// Returns the removed paths, sorted.
    pub fn remove_stale_fragments<P: AsRef<Path>>(output_dir: P, kind: FragmentKind, keep: usize) -> Result<Vec<PathBuf>> {
        let output_dir = output_dir.as_ref();
        if !Self::dir_exists(output_dir) {
            return Ok(Vec::new());
        }

        let mut removed = Vec::new();
        let entries = fs::read_dir(output_dir)
            .with_context(|| format!("Failed to read directory: {:?}", output_dir))?;
        for entry in entries {
            let path = entry.context("Failed to read directory entry")?.path();
            let stale = Self::fragment_index(&path, kind).is_some_and(|index| index >= keep);
            if stale && path.is_file() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove stale fragment: {:?}", path))?;
                removed.push(path);
            }
        }

        removed.sort();
        Ok(removed)
    }
}
