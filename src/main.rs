// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use subchunk::app_config::{self, Config};
use subchunk::app_controller::Controller;

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
    /// Translate an SRT file, or every SRT file of a directory
    Translate(TranslateArgs),

    /// Parse an SRT file and report structural issues
    Validate {
        /// SRT file to check
        #[arg(value_name = "SRT_FILE")]
        input_path: PathBuf,

        /// Set logging level
        #[arg(short, long, value_enum)]
        log_level: Option<CliLogLevel>,
    },

    /// Convert an SRT file to a JSON subtitle document
    Parse {
        /// SRT file to convert
        #[arg(value_name = "SRT_FILE")]
        input_path: PathBuf,

        /// Output JSON path (default: same name with .json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a JSON subtitle document back to SRT
    Convert {
        /// JSON document to convert
        #[arg(value_name = "JSON_FILE")]
        input_path: PathBuf,

        /// Output SRT path (default: same name with .srt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions for subchunk
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input SRT file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Target language code (e.g., 'es', 'fr', 'ar')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Output SRT file (single file only, default: <stem>_<lang>.srt)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of subtitles per chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Number of context subtitles before and after each chunk
    #[arg(long)]
    overlap: Option<usize>,

    /// Title of the video, given to the model as context
    #[arg(long, alias = "video-title")]
    title: Option<String>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Retries per chunk on transient provider errors
    #[arg(long)]
    retries: Option<u32>,

    /// Translate without loading a style profile
    #[arg(long)]
    no_profile: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// subchunk - chunked, context-aware subtitle translation
///
/// Translates SRT subtitle files through a language model, a chunk at a time,
/// keeping every subtitle's number and timing intact.
#[derive(Parser, Debug)]
#[command(name = "subchunk")]
#[command(version)]
#[command(about = "Chunked, context-aware subtitle translation")]
#[command(long_about = "subchunk translates SRT subtitle files with a language model, chunk by chunk.

EXAMPLES:
    subchunk translate talk.srt -t es                 # Writes talk_es.srt
    subchunk translate talk.srt -t fr --title \"Intro\" # Give the video title as context
    subchunk translate talk.srt -t ar --chunk-size 40 --overlap 5
    subchunk translate subtitles/ -t es              # Translate every SRT file of a directory
    subchunk validate talk.srt                        # Report structural issues
    subchunk parse talk.srt -o talk.json              # Export to JSON
    subchunk convert talk.json -o talk.srt            # Import from JSON
    subchunk completions bash > subchunk.bash         # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. The API key may also come from ANTHROPIC_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // Accept every record; the global max level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
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
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn apply_log_level(level: Option<&CliLogLevel>) {
    if let Some(cli_level) = level {
        let config_level: app_config::LogLevel = cli_level.clone().into();
        log::set_max_level(config_level.to_level_filter());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subchunk", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
        Commands::Validate { input_path, log_level } => {
            apply_log_level(log_level.as_ref());
            let (_, report) = Controller::validate_file(&input_path)?;
            if report.valid {
                Ok(())
            } else {
                Err(anyhow!("{} has {} structural issues", input_path.display(), report.issues.len()))
            }
        }
        Commands::Parse { input_path, output } => {
            Controller::export_json(&input_path, output)?;
            Ok(())
        }
        Commands::Convert { input_path, output } => {
            Controller::import_json(&input_path, output)?;
            Ok(())
        }
    }
}

/// Load the config file and apply command line overrides
fn load_config(options: &TranslateArgs) -> Result<Config> {
    let (mut config, created) = Config::load_or_create(&options.config_path)?;
    if created {
        warn!("Config file not found at '{}', created default config.", options.config_path);
    }

    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(chunk_size) = options.chunk_size {
        config.chunking.chunk_size = chunk_size;
    }
    if let Some(overlap) = options.overlap {
        config.chunking.overlap = overlap;
    }
    if let Some(title) = &options.title {
        config.context_title = Some(title.clone());
    }
    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }
    if let Some(api_key) = &options.api_key {
        config.translation.active_provider_config_mut().api_key = api_key.clone();
    }
    if let Some(retries) = options.retries {
        config.translation.common.retry_count = retries;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // Apply a command line log level before the config is read
    apply_log_level(options.log_level.as_ref());

    let config = load_config(&options)?;
    config.validate()
        .context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let mut controller = Controller::with_config(config)?;
    if options.no_profile {
        controller = controller.without_style_profile();
    }

    if let Err(e) = controller.check_connection().await {
        warn!("Provider connection check failed: {:#}", e);
    }

    if options.input_path.is_file() {
        let result = controller
            .run(options.input_path.clone(), options.output.clone(), options.force_overwrite)
            .await?;
        info!("Translation complete! Output: {}", result.output_path.display());
    } else if options.input_path.is_dir() {
        if options.output.is_some() {
            return Err(anyhow!("--output can only be used with a single input file"));
        }
        controller.run_folder(options.input_path.clone(), options.force_overwrite).await?;
    } else {
        return Err(anyhow!("Input path does not exist: {}", options.input_path.display()));
    }

    Ok(())
}
