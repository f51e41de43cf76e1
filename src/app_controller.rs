use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::compiler::Compiler;
use crate::document::Document;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::input_resolver::InputResolver;
use crate::noise_filter::NoiseFilter;
use crate::splitter::{split_by_boundary, split_by_environment, FragmentKind};

// @module: Application controller for document splitting

/// Outcome of one run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunReport {
    /// Fragments written because their content changed
    pub written: Vec<PathBuf>,
    /// Fragments left alone because they were identical on disk
    pub unchanged: Vec<PathBuf>,
    /// Fragments whose compilation failed
    pub compile_failures: Vec<PathBuf>,
    /// Fragments from earlier runs that no longer exist in the document
    pub removed: Vec<PathBuf>,
    /// Whether the flattened copy was rewritten
    pub flattened_changed: bool,
}

impl RunReport {
    /// True when any fragment was written or removed
    pub fn any_changed(&self) -> bool {
        !self.written.is_empty() || !self.removed.is_empty()
    }

    pub fn fragment_count(&self) -> usize {
        self.written.len() + self.unchanged.len()
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Compiler output filter built from the configuration
    filter: NoiseFilter,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self, AppError> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        let filter = NoiseFilter::new(config.filter_options());

        Ok(Self { config, filter })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load and flatten the input document
    pub fn flatten(&self, input_file: &Path) -> Result<Document, AppError> {
        let base_dir = input_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let resolver = InputResolver::new(base_dir, &self.config.markers);
        Ok(resolver.resolve_file(input_file)?)
    }

    /// Split the flattened document with both splitters, boundary fragments first
    pub fn split(&self, document: &Document) -> Result<Vec<(FragmentKind, Vec<Document>)>, AppError> {
        let markers = &self.config.markers;
        let boundary = split_by_boundary(document, &self.config.split.boundaries, markers)?;
        let environment = split_by_environment(document, &self.config.split.environments, markers)?;
        debug!(
            "Split into {} boundary and {} environment fragments",
            boundary.len(),
            environment.len()
        );

        Ok(vec![
            (FragmentKind::Boundary, boundary),
            (FragmentKind::Environment, environment),
        ])
    }

    /// Run the main workflow for one input document
    pub fn run(&self, input_file: &Path, compiler: &dyn Compiler) -> Result<RunReport, AppError> {
        let start_time = std::time::Instant::now();

        if Document::locate(input_file).is_none() {
            warn!("Input file not found, treating it as empty: {:?}", input_file);
        }

        let output_dir = &self.config.output_dir;
        FileManager::ensure_dir(output_dir)?;

        let flattened = self.flatten(input_file)?;
        let mut report = RunReport {
            flattened_changed: FileManager::write_if_changed(FileManager::flattened_path(output_dir), &flattened)?,
            ..RunReport::default()
        };

        let groups = self.split(&flattened)?;
        let total: usize = groups.iter().map(|(_, fragments)| fragments.len()).sum();
        let progress_bar = self.progress_bar(total as u64);

        for (kind, fragments) in &groups {
            for (index, fragment) in fragments.iter().enumerate() {
                let path = FileManager::fragment_path(output_dir, *kind, index);
                progress_bar.set_message(format!("{} {}", kind, index));

                if FileManager::write_if_changed(&path, fragment)? {
                    info!("Generated {}", path.display());
                    if self.config.compile.enabled {
                        let compiled = progress_bar.suspend(|| self.compile_fragment(&path, compiler));
                        if !compiled {
                            report.compile_failures.push(path.clone());
                        }
                    }
                    report.written.push(path);
                } else {
                    report.unchanged.push(path);
                }
                progress_bar.inc(1);
            }

            let removed = FileManager::remove_stale_fragments(output_dir, *kind, fragments.len())
                .with_context(|| format!("Failed to clean up {} fragments", kind))?;
            for path in &removed {
                info!("Removed stale fragment {}", path.display());
            }
            report.removed.extend(removed);
        }

        progress_bar.finish_and_clear();
        info!(
            "{} fragment(s): {} written, {} unchanged, {} compile failure(s) in {:.2?}",
            report.fragment_count(),
            report.written.len(),
            report.unchanged.len(),
            report.compile_failures.len(),
            start_time.elapsed()
        );

        Ok(report)
    }

    /// Compile one fragment and print its (filtered) output.
    ///
    /// Returns whether compilation succeeded. Failures are reported and never
    /// abort the run.
    fn compile_fragment(&self, path: &Path, compiler: &dyn Compiler) -> bool {
        info!("Compiling {}", path.display());
        match compiler.compile(path, &self.config.output_dir) {
            Ok(result) => {
                let shown = if self.config.compile.nice_output {
                    self.filter.format(&result.output)
                } else {
                    result.output
                };
                if !shown.trim().is_empty() {
                    println!("{}", shown.trim_end());
                }

                if !result.success {
                    match result.exit_code {
                        Some(code) => error!("Compilation of {} failed with exit code {}", path.display(), code),
                        None => error!("Compilation of {} was terminated by a signal", path.display()),
                    }
                }
                result.success
            }
            Err(e) => {
                error!("Compilation of {} failed: {}", path.display(), e);
                false
            }
        }
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.config.compile.enabled {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(total);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} fragments ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }
}
