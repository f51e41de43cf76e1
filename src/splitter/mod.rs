/*!
 * Document splitting.
 *
 * Both splitters scan a flattened document line by line while tracking
 * their position in a `ScanStack`:
 *
 * - `environment`: every outermost occurrence of a named environment
 *   becomes its own fragment, prefixed by the shared preamble
 * - `boundary`: the body is cut at literal boundary markers, each piece
 *   framed by the shared preamble and postamble
 * - `scan_state`: the scan state type and its stack
 */

// Re-export main entry points for easier usage
pub use self::boundary::split_by_boundary;
pub use self::environment::split_by_environment;
pub use self::scan_state::{ScanStack, ScanState};

// Submodules
pub mod boundary;
pub mod environment;
pub mod scan_state;

use std::fmt;

/// Which splitter produced a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// Produced by `split_by_boundary`
    Boundary,
    /// Produced by `split_by_environment`
    Environment,
}

impl FragmentKind {
    // @returns: File name prefix; the two kinds never share file names
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Self::Boundary => "boundary-",
            Self::Environment => "environment-",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boundary => write!(f, "boundary"),
            Self::Environment => write!(f, "environment"),
        }
    }
}
