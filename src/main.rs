// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use latex_autosplit::app_config::{self, Config};
use latex_autosplit::{Controller, ShellCompiler};

/// At least one fragment was written or removed
const EXIT_CHANGED: u8 = 0;
/// The run failed
const EXIT_ERROR: u8 = 1;
/// Every fragment was already up to date
const EXIT_UNCHANGED: u8 = 2;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for latex-autosplit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// latex-autosplit - split LaTeX documents for incremental compilation
///
/// Splits a LaTeX document into fragments at environments and boundary
/// markers, rewriting (and optionally compiling) only the fragments that changed.
#[derive(Parser, Debug)]
#[command(name = "latex-autosplit")]
#[command(version)]
#[command(about = "Split LaTeX documents into incrementally compiled fragments")]
#[command(long_about = "latex-autosplit flattens a LaTeX document, splits it into fragments and writes
every fragment whose content changed since the last run.

EXAMPLES:
    latex-autosplit thesis.tex                          # Split at \\chapter and frames
    latex-autosplit -b '\\section' thesis.tex            # Split at sections instead
    latex-autosplit -e frame -e block talk.tex          # Extract frames and blocks
    latex-autosplit -a --no-box-warnings thesis.tex     # Compile changed fragments
    latex-autosplit completions bash > autosplit.bash   # Generate bash completions

MANUAL REGIONS:
    Lines between '%autosplit start region <name>' and '%autosplit end region'
    are never split. The region named 'postamble' is appended to every
    boundary fragment instead.

EXIT STATUS:
    0 when at least one fragment changed, 2 when nothing changed, 1 on error.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// LaTeX file to split
    #[arg(value_name = "LATEX_FILE")]
    input_file: Option<PathBuf>,

    /// Directory for saving fragments and compiler output
    #[arg(short = 'o', long = "tmp-dir", value_name = "DIR")]
    tmp_dir: Option<PathBuf>,

    /// Environment to extract into its own fragment (repeatable, comma separated)
    #[arg(short, long = "environment", value_name = "NAME", value_delimiter = ',')]
    environments: Vec<String>,

    /// Marker starting a new boundary fragment (repeatable)
    #[arg(short, long = "boundary", value_name = "MARKER")]
    boundaries: Vec<String>,

    /// Compiler command; -output-directory and the fragment are appended
    #[arg(short = 'c', long, value_name = "COMMAND")]
    compile_command: Option<String>,

    /// Compile every fragment that changed
    #[arg(short, long)]
    autocompile: bool,

    /// Filter compiler output down to actionable diagnostics
    #[arg(short, long, conflicts_with = "raw_output")]
    nice_output: bool,

    /// Show compiler output unfiltered
    #[arg(long)]
    raw_output: bool,

    /// Also hide overfull/underfull box warnings
    #[arg(long)]
    no_box_warnings: bool,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Print the resolved options before running
    #[arg(short, long)]
    debug: bool,
}

// @struct: Custom logger implementation, filtering on the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }

    // @returns: Prefix for log level
    fn get_prefix_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "error:",
            Level::Warn => "warning:",
            Level::Info => "",
            Level::Debug => "debug:",
            Level::Trace => "trace:",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_prefix_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn to_level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

fn main() -> ExitCode {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("error: failed to initialize logging: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: CommandLineOptions) -> Result<u8> {
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "latex-autosplit", &mut std::io::stdout());
        return Ok(EXIT_CHANGED);
    }

    let input_file = cli
        .input_file
        .clone()
        .ok_or_else(|| anyhow!("LATEX_FILE is required when no subcommand is specified"))?;

    let config = build_config(&cli)?;
    log::set_max_level(to_level_filter(&config.log_level));

    config.validate().context("Configuration validation failed")?;

    if cli.debug {
        let options = serde_json::to_string_pretty(&config)
            .context("Failed to serialize options")?;
        info!("Input file: {:?}", input_file);
        info!("Options:\n{}", options);
    }

    let controller = Controller::with_config(config.clone())?;
    let compiler = ShellCompiler::new(config.compile.command.clone());
    let report = controller.run(&input_file, &compiler)?;

    if !report.compile_failures.is_empty() {
        error!("{} fragment(s) failed to compile", report.compile_failures.len());
    }

    if report.any_changed() {
        Ok(EXIT_CHANGED)
    } else {
        info!("Nothing changed");
        Ok(EXIT_UNCHANGED)
    }
}

/// Load the configuration file, if any, and apply command line overrides
fn build_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            debug!("Loading configuration from {:?}", path);
            Config::from_file(path)?
        }
        None => Config::default(),
    };

    if let Some(tmp_dir) = &cli.tmp_dir {
        config.output_dir = tmp_dir.clone();
    }

    if !cli.environments.is_empty() {
        config.split.environments = cli.environments.clone();
    }

    if !cli.boundaries.is_empty() {
        config.split.boundaries = cli.boundaries.clone();
    }

    if let Some(command) = &cli.compile_command {
        config.compile.command = command.clone();
    }

    if cli.autocompile {
        config.compile.enabled = true;
    }

    if cli.nice_output {
        config.compile.nice_output = true;
    }

    if cli.raw_output {
        config.compile.nice_output = false;
    }

    if cli.no_box_warnings {
        config.compile.suppress_box_warnings = true;
    }

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}
