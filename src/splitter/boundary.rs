use log::{debug, warn};

use crate::app_config::Markers;
use crate::document::Document;
use crate::errors::ScanError;
use crate::splitter::scan_state::{ScanStack, ScanState};

// @module: Sequential splitting at literal boundary markers

/// Cut the document body into consecutive fragments at boundary markers.
///
/// Every fragment is `preamble + section + postamble + document end`. Lines
/// between a `region_start` annotation and its `region_end` are never
/// checked for boundaries; the region named `postamble_region` collects the
/// shared tail instead of body text. Scanning stops at the document end.
/// Without any boundary markers the document is not fragmented at all.
pub fn split_by_boundary(
    document: &Document,
    boundaries: &[String],
    markers: &Markers,
) -> Result<Vec<Document>, ScanError> {
    if boundaries.is_empty() {
        debug!("No boundary markers configured, skipping boundary split");
        return Ok(Vec::new());
    }

    let mut sections: Vec<String> = Vec::new();
    let mut preamble = String::new();
    let mut postamble = String::new();
    let mut part = String::new();
    let mut stack = ScanStack::new();

    for (number, line) in document.lines().enumerate() {
        if let Some(name) = region_name(line, &markers.region_start) {
            let state = if name == markers.postamble_region {
                ScanState::Postamble
            } else {
                ScanState::Manual(name.to_string())
            };
            debug!("Line {}: entering region {}", number + 1, state);
            stack.push(state);
            continue;
        }

        if line.contains(markers.region_end.as_str()) {
            match stack.pop() {
                Ok(state) => debug!("Line {}: leaving region {}", number + 1, state),
                Err(e) => warn!("Line {}: ignoring unmatched region end ({})", number + 1, e),
            }
            continue;
        }

        if stack.top() == &ScanState::Normal {
            let boundary = boundaries.iter().find(|b| line.contains(b.as_str()));
            if let Some(marker) = boundary {
                if !part.trim().is_empty() {
                    debug!("Line {}: boundary '{}' closes section {}", number + 1, marker, sections.len());
                    let mut section = String::with_capacity(preamble.len() + part.len());
                    section.push_str(&preamble);
                    section.push_str(&part);
                    sections.push(section);
                    part.clear();
                }
            }
        }

        if line.contains(markers.document_end.as_str()) {
            break;
        }

        match stack.effective() {
            ScanState::Header => preamble.push_str(line),
            ScanState::Normal => part.push_str(line),
            ScanState::Postamble => postamble.push_str(line),
            ScanState::Environment(_) | ScanState::Manual(_) => {}
        }

        if line.contains(markers.document_begin.as_str()) {
            stack.begin_body();
        }
    }

    if !part.trim().is_empty() {
        let mut section = preamble;
        section.push_str(&part);
        sections.push(section);
    }

    let tail = format!("{}{}", postamble, markers.document_end_line());
    Ok(sections
        .into_iter()
        .map(|mut section| {
            section.push_str(&tail);
            Document::new(section)
        })
        .collect())
}

/// Region name following the start annotation, if the line carries one
fn region_name<'a>(line: &'a str, region_start: &str) -> Option<&'a str> {
    let at = line.find(region_start)?;
    Some(line[at + region_start.len()..].trim())
}
