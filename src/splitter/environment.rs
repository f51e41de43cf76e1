use log::debug;

use crate::app_config::Markers;
use crate::document::Document;
use crate::errors::ScanError;
use crate::splitter::scan_state::{ScanStack, ScanState};

// @module: Extraction of named environments into standalone documents

/// Extract every outermost occurrence of the named environments.
///
/// Each fragment is the shared preamble followed by the environment body
/// and a synthesized document end marker. Body text outside of any
/// environment accumulates into the preamble, so later fragments carry the
/// top-level content that preceded them.
pub fn split_by_environment(
    document: &Document,
    environments: &[String],
    markers: &Markers,
) -> Result<Vec<Document>, ScanError> {
    let delimiters: Vec<(String, String, String)> = environments
        .iter()
        .map(|name| {
            (
                name.clone(),
                Markers::environment_begin(name),
                Markers::environment_end(name),
            )
        })
        .collect();

    let mut fragments = Vec::new();
    let mut preamble = String::new();
    let mut part = String::new();
    let mut stack = ScanStack::new();

    for (number, line) in document.lines().enumerate() {
        if stack.top() != &ScanState::Header {
            if let Some((name, _, _)) = delimiters.iter().find(|(_, begin, _)| line.contains(begin.as_str())) {
                debug!("Line {}: entering environment {}", number + 1, name);
                stack.push(ScanState::Environment(name.clone()));
            }
        }

        if line.contains(markers.document_begin.as_str()) {
            stack.begin_body();
        }

        match stack.top() {
            ScanState::Header | ScanState::Normal => preamble.push_str(line),
            _ => part.push_str(line),
        }

        let closes = match stack.top() {
            ScanState::Environment(name) => delimiters
                .iter()
                .any(|(n, _, end)| n == name && line.contains(end.as_str())),
            _ => false,
        };

        if closes {
            stack.pop()?;
            if stack.top() == &ScanState::Normal {
                debug!("Line {}: environment fragment {} complete", number + 1, fragments.len());
                let mut fragment = String::with_capacity(preamble.len() + part.len() + 16);
                fragment.push_str(&preamble);
                fragment.push_str(&part);
                fragment.push_str(&markers.document_end_line());
                fragments.push(Document::new(fragment));
                part.clear();
            }
        }
    }

    Ok(fragments)
}
