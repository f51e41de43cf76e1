/*!
 * Scan mode tracking shared by both splitters.
 *
 * A scan pass keeps a stack of `ScanState`s. The bottom entry is `Header`
 * until the document begins, then `Normal`; environments and manual regions
 * are pushed on top of it and popped when they end. The stack is never empty.
 */

use std::fmt;

use crate::errors::ScanError;

/// Where the scanner currently is in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// Before the document-start marker
    Header,
    /// Top-level document body
    Normal,
    /// Inside a configured environment
    Environment(String),
    /// Inside the shared postamble region
    Postamble,
    /// Inside an author-defined region excluded from boundary detection
    Manual(String),
}

impl ScanState {
    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual(_))
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Normal => write!(f, "normal"),
            Self::Environment(name) => write!(f, "env:{}", name),
            Self::Postamble => write!(f, "postamble"),
            Self::Manual(name) => write!(f, "manual:{}", name),
        }
    }
}

/// Non-empty LIFO of scan states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanStack {
    states: Vec<ScanState>,
}

impl ScanStack {
    /// A fresh stack positioned in the header
    pub fn new() -> Self {
        Self {
            states: vec![ScanState::Header],
        }
    }

    pub fn top(&self) -> &ScanState {
        // The constructor seeds one state and `pop` never removes the last one
        &self.states[self.states.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.states.len()
    }

    pub fn push(&mut self, state: ScanState) {
        self.states.push(state);
    }

    /// Remove and return the top state; the bottom state cannot be removed
    pub fn pop(&mut self) -> Result<ScanState, ScanError> {
        if self.states.len() == 1 {
            return Err(ScanError::StackUnderflow {
                state: self.top().to_string(),
            });
        }
        Ok(self.states.pop().unwrap_or(ScanState::Header))
    }

    /// Switch the bottom state from `Header` to `Normal`.
    ///
    /// Returns `false` when the body had already begun.
    pub fn begin_body(&mut self) -> bool {
        if self.states[0] == ScanState::Header {
            self.states[0] = ScanState::Normal;
            true
        } else {
            false
        }
    }

    /// Innermost state that is not a manual region
    pub fn effective(&self) -> &ScanState {
        self.states
            .iter()
            .rev()
            .find(|state| !state.is_manual())
            .unwrap_or(&self.states[0])
    }
}

impl Default for ScanStack {
    fn default() -> Self {
        Self::new()
    }
}
