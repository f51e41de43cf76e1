/*!
 * Inlining of `\input` and `\include` directives.
 *
 * The resolver produces one flattened document so the splitters see the
 * whole structure at once. Included paths are taken relative to the
 * directory of the top-level file, like TeX does when run from there.
 */

use std::path::{Path, PathBuf};

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::Markers;
use crate::document::Document;
use crate::errors::ResolveError;

/// `\input{path}` or `\include{path}` with a single brace argument
static INCLUDE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:input|include)\{([^{}]+)\}").expect("include pattern is valid")
});

/// Recursive include resolver
#[derive(Debug, Clone)]
pub struct InputResolver {
    // @field: Directory includes are resolved against
    base_dir: PathBuf,
    // @field: Comment marker used to detect commented-out directives
    comment: String,
}

impl InputResolver {
    pub fn new<P: AsRef<Path>>(base_dir: P, markers: &Markers) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            comment: markers.comment.clone(),
        }
    }

    /// Resolve all includes of an in-memory document
    pub fn resolve(&self, document: &Document) -> Result<Document, ResolveError> {
        let mut chain = Vec::new();
        self.expand(document, &mut chain)
    }

    /// Load `path` and resolve it, recording it as the root of the include chain
    pub fn resolve_file<P: AsRef<Path>>(&self, path: P) -> Result<Document, ResolveError> {
        let path = path.as_ref();
        let document = Document::load(path)?;
        let root = Document::locate(path).unwrap_or_else(|| path.to_path_buf());
        let mut chain = vec![Self::identity(&root)];
        self.expand(&document, &mut chain)
    }

    fn expand(&self, document: &Document, chain: &mut Vec<PathBuf>) -> Result<Document, ResolveError> {
        let text = document.as_str();
        let mut result = String::with_capacity(text.len());
        let mut last = 0;

        for caps in INCLUDE_REGEX.captures_iter(text) {
            let Some(directive) = caps.get(0) else {
                continue;
            };
            if self.is_commented_out(text, directive.start()) {
                continue;
            }

            result.push_str(&text[last..directive.start()]);
            last = directive.end();

            let target = caps[1].trim();
            let included = self.include(target, chain)?;
            result.push_str(included.as_str());
        }

        result.push_str(&text[last..]);
        Ok(Document::new(result))
    }

    fn include(&self, target: &str, chain: &mut Vec<PathBuf>) -> Result<Document, ResolveError> {
        let requested = self.base_dir.join(target);
        let Some(found) = Document::locate(&requested) else {
            warn!("Included file not found, using empty content: {:?}", requested);
            return Ok(Document::empty());
        };

        let identity = Self::identity(&found);
        if chain.contains(&identity) {
            return Err(ResolveError::CircularInclusion {
                path: found,
                chain: chain.clone(),
            });
        }

        debug!("Inlining {:?}", found);
        let document = Document::load(&found)?;
        chain.push(identity);
        let resolved = self.expand(&document, chain);
        chain.pop();
        resolved
    }

    /// True when an unescaped comment marker precedes `position` on its line.
    ///
    /// A marker is escaped by an odd run of backslashes; `\\%` is a line
    /// break followed by a comment.
    fn is_commented_out(&self, text: &str, position: usize) -> bool {
        let line_start = text[..position].rfind('\n').map_or(0, |i| i + 1);
        let prefix = &text[line_start..position];

        prefix.match_indices(self.comment.as_str()).any(|(i, _)| {
            let backslashes = prefix[..i].bytes().rev().take_while(|b| *b == b'\\').count();
            backslashes % 2 == 0
        })
    }

    // Canonical form when possible so `a/../b.tex` and `b.tex` compare equal
    fn identity(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
    }
}
