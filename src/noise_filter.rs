/*!
 * Compiler output noise filter.
 *
 * TeX reports every file it opens, every page it ships out and a fair
 * amount of boilerplate. This module folds the compiler's hard-wrapped
 * lines back together and then rewrites the text with an ordered list of
 * regex rules until nothing changes any more, leaving the diagnostics that
 * actually need attention.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

/// Rule groups, applied in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    /// Known boilerplate messages
    Message,
    /// Overfull/underfull box notes
    BoxWarning,
    /// File citations, page markers and whitespace
    Cleanup,
}

/// A single rewrite rule
#[derive(Debug)]
pub struct FilterRule {
    pub pattern: Regex,
    pub replacement: &'static str,
    pub category: RuleCategory,
}

impl FilterRule {
    fn new(pattern: &str, replacement: &'static str, category: RuleCategory) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("filter rule pattern is valid"),
            replacement,
            category,
        }
    }

    /// One rewrite pass over `text`
    pub fn apply(&self, text: &str) -> String {
        self.pattern.replace_all(text, self.replacement).into_owned()
    }
}

/// Literal boilerplate, escaped before compiling
const MESSAGE_LITERALS: &[&str] = &[
    "(see the transcript file for additional information)",
    "See the LaTeX manual or LaTeX Companion for explanation.",
    "Type  H <return>  for immediate help.",
    "Document Style algorithmicx 1.2 - a greatly improved `algorithmic' style",
    "Document Style - pseudocode environments for use with the `algorithmicx' style",
    "For additional information on amsmath, use the `?' option.",
    " ...       ",
    "Excluding comment 'comment'",
    "*geometry* driver: auto-detecting",
    "*geometry* detected driver: pdftex",
    "ABD: EveryShipout initializing macros",
    "entering extended mode",
];

/// Boilerplate with variable parts
const MESSAGE_PATTERNS: &[&str] = &[
    r"\[Loading MPS to PDF converter \(version .*\).\]",
    r"Document Class: report .{10,20} Standard LaTeX document class",
    r"This is pdfTeX, Version [^\n]{10,250}\n",
    r"LaTeX2e [^\n]{10,50}\n",
    r"Babel .{0,10} and hyphenation patterns for .{0,3} language\(s\) loaded\.",
    r"Transcript written on[^\n]*",
];

static MESSAGE_RULES: Lazy<Vec<FilterRule>> = Lazy::new(|| {
    MESSAGE_LITERALS
        .iter()
        .map(|literal| regex::escape(literal))
        .chain(MESSAGE_PATTERNS.iter().map(|p| p.to_string()))
        .map(|pattern| FilterRule::new(&pattern, "", RuleCategory::Message))
        .collect()
});

static BOX_RULES: Lazy<Vec<FilterRule>> = Lazy::new(|| {
    vec![FilterRule::new(
        r"(?:Under|Over)full \\.box \([^()]*\) (?:has occurred while \\output is active|in paragraph at lines [0-9]+--[0-9]+)",
        "",
        RuleCategory::BoxWarning,
    )]
});

static CLEANUP_RULES: Lazy<Vec<FilterRule>> = Lazy::new(|| {
    vec![
        // Files within <>
        FilterRule::new(r"<[^<>]*\.(?:pfb|png)>", "", RuleCategory::Cleanup),
        // Files within {}
        FilterRule::new(r"\{[^{}]*\.(?:enc|map)\}", "", RuleCategory::Cleanup),
        // Files within (), including the pages shipped out while they were open
        FilterRule::new(
            r"\n?\([^()]*\.(?:tex|sty|dfu|def|cfg|fd|mdf|aux|clo|bbl|out|mkii|cls)\s*(?:\[[0-9]+\]\s*)*\)\n?",
            "",
            RuleCategory::Cleanup,
        ),
        // Spaces in front of ]
        FilterRule::new(r"\s*\]", "]", RuleCategory::Cleanup),
        // Page runs following a ]
        FilterRule::new(r"\](?:\s*\[[0-9]+\])*\s*", "]\n", RuleCategory::Cleanup),
        // Blank line runs
        FilterRule::new(r"\n\s*\n(?:\s*\n)*", "\n\n", RuleCategory::Cleanup),
        // Newlines in front of )
        FilterRule::new(r"\n(?:\s*\n)*\s*\)", " )", RuleCategory::Cleanup),
        // [] lines
        FilterRule::new(r"\n(?:\s*\[\]\s*\n)+\s*", "\n", RuleCategory::Cleanup),
        // [n] as (page n)
        FilterRule::new(r"\n(?:\s*\n\s*)*\[([0-9]+)\]", " (page ${1})\n", RuleCategory::Cleanup),
    ]
});

/// Filter settings
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    /// Lines at least this long are continued on the next line
    pub line_width: usize,
    /// Cap for every fixed-point loop
    pub max_iterations: usize,
    /// Drop overfull/underfull box warnings as well
    pub suppress_box_warnings: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            line_width: 79,
            max_iterations: 64,
            suppress_box_warnings: false,
        }
    }
}

/// Apply `step` until its output equals its input.
///
/// Gives up after `max_iterations` steps and returns the latest value.
pub fn until_stable<F>(value: String, max_iterations: usize, mut step: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut current = value;
    for _ in 0..max_iterations {
        let next = step(&current);
        if next == current {
            return current;
        }
        current = next;
    }
    warn!("No fixed point after {} iterations, keeping the last result", max_iterations);
    current
}

/// Undo the compiler's hard wrapping.
///
/// A line of at least `width` bytes is glued to the lines after it until a
/// shorter line ends the logical line. A trailing newline is preserved.
pub fn fold_long_lines(raw: &str, width: usize) -> String {
    let (body, trailing_newline) = match raw.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (raw, false),
    };

    let mut folded = String::with_capacity(raw.len());
    let mut first = true;
    let mut continued = false;
    for line in body.split('\n') {
        if !first && !continued {
            folded.push('\n');
        }
        first = false;
        folded.push_str(line);
        continued = line.len() >= width;
    }

    if trailing_newline {
        folded.push('\n');
    }
    folded
}

/// Compiler output filter
#[derive(Debug)]
pub struct NoiseFilter {
    options: FilterOptions,
    rules: Vec<&'static FilterRule>,
}

impl NoiseFilter {
    pub fn new(options: FilterOptions) -> Self {
        let mut rules: Vec<&'static FilterRule> = MESSAGE_RULES.iter().collect();
        if options.suppress_box_warnings {
            rules.extend(BOX_RULES.iter());
        }
        rules.extend(CLEANUP_RULES.iter());

        Self { options, rules }
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Rules in the order they are applied
    pub fn rules(&self) -> &[&'static FilterRule] {
        &self.rules
    }

    /// Clean raw compiler output: fold wrapped lines, then run the rules
    pub fn format(&self, raw: &str) -> String {
        let folded = fold_long_lines(raw, self.options.line_width);
        let cleaned = self.clean(&folded);
        debug!("Filtered compiler output from {} to {} bytes", raw.len(), cleaned.len());
        cleaned
    }

    /// Run the rule pipeline until a full pass changes nothing
    pub fn clean(&self, text: &str) -> String {
        until_stable(text.to_string(), self.options.max_iterations, |t| self.apply_rules(t))
    }

    /// One pass of the whole pipeline, each rule run to its own fixed point
    pub fn apply_rules(&self, text: &str) -> String {
        self.rules.iter().fold(text.to_string(), |acc, rule| {
            until_stable(acc, self.options.max_iterations, |t| rule.apply(t))
        })
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new(FilterOptions::default())
    }
}
