/*!
 * Document model.
 *
 * A `Document` is an immutable piece of LaTeX source. Splitters and the
 * input resolver build new documents instead of mutating existing ones, and
 * equality is plain textual equality, which is what change detection needs.
 */

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::DocumentError;

/// Conventional extension tried when a referenced path does not exist
pub const TEX_EXTENSION: &str = "tex";

/// Immutable text content of a LaTeX document
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Document {
    content: String,
}

impl Document {
    /// Create a document from its text
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// The empty document, used for missing inputs
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn into_string(self) -> String {
        self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// True when the document has nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Iterate over lines, each keeping its line terminator
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split_inclusive('\n')
    }

    /// Find the file a path refers to, falling back to the `.tex` extension
    pub fn locate<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
        let path = path.as_ref();
        if path.is_file() {
            return Some(path.to_path_buf());
        }

        let mut with_extension = path.as_os_str().to_owned();
        with_extension.push(".");
        with_extension.push(TEX_EXTENSION);
        let with_extension = PathBuf::from(with_extension);
        if with_extension.is_file() {
            return Some(with_extension);
        }

        None
    }

    /// Read a document from disk.
    ///
    /// A path that cannot be located, even with the `.tex` fallback, yields
    /// an empty document. Only a failing read of an existing file is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let Some(found) = Self::locate(path) else {
            debug!("No file at {:?}, treating it as empty", path);
            return Ok(Self::empty());
        };

        let content = fs::read_to_string(&found).map_err(|source| DocumentError::Read {
            path: found.clone(),
            source,
        })?;
        Ok(Self::new(content))
    }

    /// Write the full content to `path`, replacing any existing file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let write_error = |source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(write_error)?;
            }
        }

        fs::write(path, &self.content).map_err(write_error)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.content)
    }
}

impl From<String> for Document {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

impl From<&str> for Document {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}
