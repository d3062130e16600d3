// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use podscript::app_config::{Config, LogLevel};
use podscript::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a single TTML file into a text transcript
    Convert(ConvertArgs),

    /// Convert every cached TTML transcript (default when no files are given)
    Batch(BatchArgs),

    /// Download the TTML transcript of an episode by store track id
    Fetch {
        /// Store track id of the episode
        episode_id: u64,

        /// Output file (defaults to the name of the transcript asset)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the episodes of a show, newest first
    Episodes {
        /// Store collection id of the show
        store_collection_id: i64,
    },

    /// Generate shell completions for podscript
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input TTML file
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    /// Output text file
    #[arg(value_name = "OUTPUT_FILE")]
    output_file: PathBuf,

    /// Include timestamps in the transcript output
    #[arg(long)]
    timestamps: bool,
}

#[derive(Args, Debug, Default)]
struct BatchArgs {
    /// Include timestamps in the transcript output
    #[arg(long)]
    timestamps: bool,

    /// Output directory for batch mode
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// TTML cache directory to scan
    #[arg(long)]
    ttml_dir: Option<PathBuf>,

    /// Podcast library database used for file names
    #[arg(long)]
    database: Option<PathBuf>,

    /// Name transcripts by content id without opening the database
    #[arg(long)]
    no_metadata: bool,

    /// Overwrite transcripts that already exist
    #[arg(short, long)]
    force: bool,

    /// Number of documents converted in parallel
    #[arg(short, long)]
    jobs: Option<usize>,
}

/// podscript - plain-text transcripts from podcast TTML files
#[derive(Parser, Debug)]
#[command(name = "podscript")]
#[command(version)]
#[command(about = "Extract plain-text transcripts from podcast TTML files")]
#[command(long_about = "podscript converts TTML caption documents into readable text transcripts.

EXAMPLES:
    podscript                                   # Convert the whole podcast TTML cache
    podscript --verbose                         # Same, with per-file details
    podscript --timestamps -o ~/my-transcripts  # Timestamps, custom output directory
    podscript input.ttml output.txt             # Convert a single file
    podscript input.ttml output.txt --timestamps
    podscript fetch 1000714478537               # Download an episode's TTML
    podscript episodes 1483081827               # List a show's episodes
    podscript completions bash > podscript.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default
    one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input TTML file (single file mode)
    #[arg(value_name = "INPUT_FILE")]
    input_file: Option<PathBuf>,

    /// Output text file (single file mode)
    #[arg(value_name = "OUTPUT_FILE")]
    output_file: Option<PathBuf>,

    #[command(flatten)]
    batch: BatchArgs,

    /// Configuration file path
    #[arg(short = 'c', long = "config", default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Print detailed processing information
    #[arg(short, long, global = true)]
    verbose: bool,
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
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "podscript", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Convert(args)) => {
            let mut config = load_config(&cli.config_path, cli.log_level, cli.verbose)?;
            config.include_timestamps |= args.timestamps;
            run_convert(config, args.input_file, args.output_file)
        }
        Some(Commands::Batch(args)) => {
            let config = load_config(&cli.config_path, cli.log_level, cli.verbose)?;
            run_batch(config, args).await
        }
        Some(Commands::Fetch { episode_id, output }) => {
            let config = load_config(&cli.config_path, cli.log_level, cli.verbose)?;
            let controller = Controller::with_config(config)?;
            controller.fetch(episode_id, output.as_deref()).await?;
            Ok(())
        }
        Some(Commands::Episodes { store_collection_id }) => {
            let config = load_config(&cli.config_path, cli.log_level, cli.verbose)?;
            let controller = Controller::with_config(config)?;
            for episode in controller.list_episodes(store_collection_id).await? {
                println!("{}", Controller::format_episode(&episode));
            }
            Ok(())
        }
        None => match (cli.input_file, cli.output_file) {
            (Some(input_file), Some(output_file)) => {
                let mut config = load_config(&cli.config_path, cli.log_level, cli.verbose)?;
                config.include_timestamps |= cli.batch.timestamps;
                run_convert(config, input_file, output_file)
            }
            (None, None) => {
                let config = load_config(&cli.config_path, cli.log_level, cli.verbose)?;
                run_batch(config, cli.batch).await
            }
            _ => CommandLineOptions::command()
                .error(
                    ErrorKind::ArgumentConflict,
                    "Either provide both input and output files for single file mode, or neither for batch mode",
                )
                .exit(),
        },
    }
}

/// Load configuration and apply the log level from the command line or the config
fn load_config(config_path: &str, log_level: Option<CliLogLevel>, verbose: bool) -> Result<Config> {
    let mut config = Config::load_or_create(config_path)?;

    if let Some(level) = log_level {
        config.log_level = level.into();
    } else if verbose {
        config.log_level = LogLevel::Debug;
    }

    // Just update the max level without reinitializing the logger
    log::set_max_level(config.log_level.to_level_filter());
    Ok(config)
}

fn run_convert(config: Config, input_file: PathBuf, output_file: PathBuf) -> Result<()> {
    if !input_file.is_file() {
        return Err(anyhow!("Input file does not exist: {:?}", input_file));
    }

    let controller = Controller::with_config(config)?;
    controller.convert_file(&input_file, &output_file)?;
    Ok(())
}

async fn run_batch(mut config: Config, args: BatchArgs) -> Result<()> {
    config.include_timestamps |= args.timestamps;
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(ttml_dir) = args.ttml_dir {
        config.ttml_dir = ttml_dir;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }
    if let Some(jobs) = args.jobs {
        config.concurrency = jobs;
    }
    if args.force {
        config.skip_existing = false;
    }

    let controller = Controller::with_config(config)?;
    let summary = controller.run_batch(!args.no_metadata).await?;

    for failure in &summary.failures {
        info!("  {} [{}]: {}", failure.identifier, failure.kind, failure.message);
    }

    Ok(())
}
