use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::noise_filter::FilterOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and merging configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Directory receiving the flattened document and all fragments
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// What to split on
    #[serde(default)]
    pub split: SplitConfig,

    /// Textual markers recognized while scanning
    #[serde(default)]
    pub markers: Markers,

    /// Compiler invocation settings
    #[serde(default)]
    pub compile: CompileConfig,

    /// Compiler output filter settings
    #[serde(default)]
    pub filter: FilterConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Split targets for both splitters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SplitConfig {
    // @field: Environment names extracted into their own fragment
    #[serde(default = "default_environments")]
    pub environments: Vec<String>,

    // @field: Literal markers starting a new boundary fragment
    #[serde(default = "default_boundaries")]
    pub boundaries: Vec<String>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            environments: default_environments(),
            boundaries: default_boundaries(),
        }
    }
}

/// Structural markers of the markup language
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Markers {
    /// Line marking the end of the preamble
    #[serde(default = "default_document_begin")]
    pub document_begin: String,

    /// Line marking the end of the body; synthesized at the end of every fragment
    #[serde(default = "default_document_end")]
    pub document_end: String,

    /// Line comment marker
    #[serde(default = "default_comment")]
    pub comment: String,

    /// Annotation opening a manual region, followed by the region name
    #[serde(default = "default_region_start")]
    pub region_start: String,

    /// Annotation closing the innermost manual region
    #[serde(default = "default_region_end")]
    pub region_end: String,

    /// Manual region name that captures the shared postamble
    #[serde(default = "default_postamble_region")]
    pub postamble_region: String,
}

impl Markers {
    // @returns: Begin marker of a named environment
    pub fn environment_begin(name: &str) -> String {
        format!("\\begin{{{}}}", name)
    }

    // @returns: End marker of a named environment
    pub fn environment_end(name: &str) -> String {
        format!("\\end{{{}}}", name)
    }

    // @returns: Document end marker as appended to fragments
    pub fn document_end_line(&self) -> String {
        format!("{}\n", self.document_end)
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            document_begin: default_document_begin(),
            document_end: default_document_end(),
            comment: default_comment(),
            region_start: default_region_start(),
            region_end: default_region_end(),
            postamble_region: default_postamble_region(),
        }
    }
}

/// External compiler configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CompileConfig {
    /// Compile each changed fragment after writing it
    #[serde(default)]
    pub enabled: bool,

    /// Shell command template; output directory and input directive are appended
    #[serde(default = "default_compile_command")]
    pub command: String,

    /// Pass compiler output through the noise filter before printing
    #[serde(default = "default_true")]
    pub nice_output: bool,

    /// Also strip overfull/underfull box warnings
    #[serde(default)]
    pub suppress_box_warnings: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: default_compile_command(),
            nice_output: default_true(),
            suppress_box_warnings: false,
        }
    }
}

/// Noise filter tuning
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FilterConfig {
    /// Width at which the compiler hard-wraps its output
    #[serde(default = "default_line_width")]
    pub line_width: usize,

    /// Iteration cap for every fixed-point loop
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            line_width: default_line_width(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_environments() -> Vec<String> {
    vec!["frame".to_string()]
}

fn default_boundaries() -> Vec<String> {
    vec!["\\chapter".to_string()]
}

fn default_document_begin() -> String {
    "\\begin{document}".to_string()
}

fn default_document_end() -> String {
    "\\end{document}".to_string()
}

fn default_comment() -> String {
    "%".to_string()
}

fn default_region_start() -> String {
    "%autosplit start region".to_string()
}

fn default_region_end() -> String {
    "%autosplit end region".to_string()
}

fn default_postamble_region() -> String {
    "postamble".to_string()
}

fn default_compile_command() -> String {
    "pdflatex -interaction=nonstopmode -halt-on-error".to_string()
}

fn default_line_width() -> usize {
    79
}

fn default_max_iterations() -> usize {
    64
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("Output directory must not be empty"));
        }

        let markers = [
            ("document_begin", &self.markers.document_begin),
            ("document_end", &self.markers.document_end),
            ("comment", &self.markers.comment),
            ("region_start", &self.markers.region_start),
            ("region_end", &self.markers.region_end),
            ("postamble_region", &self.markers.postamble_region),
        ];
        for (name, value) in markers {
            if value.trim().is_empty() {
                return Err(anyhow!("Marker '{}' must not be empty", name));
            }
        }

        // A blank entry would match every line
        if self.split.environments.iter().any(|e| e.trim().is_empty()) {
            return Err(anyhow!("Environment names must not be blank"));
        }
        if self.split.boundaries.iter().any(|b| b.trim().is_empty()) {
            return Err(anyhow!("Boundary markers must not be blank"));
        }

        if self.compile.enabled && self.compile.command.trim().is_empty() {
            return Err(anyhow!("A compile command is required when autocompile is enabled"));
        }

        if self.filter.line_width == 0 {
            return Err(anyhow!("Filter line width must be positive"));
        }

        if self.filter.max_iterations == 0 {
            return Err(anyhow!("Filter iteration cap must be positive"));
        }

        Ok(())
    }

    /// Options for the compiler output filter
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            line_width: self.filter.line_width,
            max_iterations: self.filter.max_iterations,
            suppress_box_warnings: self.compile.suppress_box_warnings,
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: default_output_dir(),
            split: SplitConfig::default(),
            markers: Markers::default(),
            compile: CompileConfig::default(),
            filter: FilterConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
