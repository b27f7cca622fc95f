// catalink CLI - merge retailer catalog exports into one product list

mod exit_codes;
mod inspect;
mod recon;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use catalink_recon::Category;
use clap::{Parser, Subcommand};
use env_logger::{Env, Target};

use exit_codes::{EXIT_CONFIG, EXIT_RUNTIME, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "catalink")]
#[command(about = "Merge product listings from several retailers into one catalog")]
#[command(version, long_version = long_version())]
struct Cli {
    /// Only log warnings and errors (RUST_LOG still wins when set)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Also write the log to this file; a directory gets a timestamped catalink-*.log
    #[arg(long, global = true, env = "CATALINK_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every source's CSVs, match them against the primary source and write merged products
    #[command(after_help = "\
Examples:
  catalink run catalog.toml
  catalink run catalog.toml --json
  catalink run catalog.toml --output merged.json
  catalink run catalog.toml --category phone --category laptop")]
    Run {
        /// Path to the catalog TOML config
        config: PathBuf,

        /// Print the result JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the result JSON to a file (overrides [output] json)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Restrict the run to these categories (repeatable)
        #[arg(long = "category", short = 'c', value_parser = parse_category)]
        categories: Vec<Category>,
    },

    /// Parse and validate a catalog config without loading any data
    #[command(after_help = "\
Examples:
  catalink validate catalog.toml")]
    Validate {
        /// Path to the catalog TOML config
        config: PathBuf,
    },

    /// Show how one product title is normalized and profiled
    #[command(after_help = "\
Examples:
  catalink inspect \"Samsung Galaxy S24 Ultra 12GB 256GB\" --category phone
  catalink inspect \"Laptop Dell Inspiron 15 3520 i5 1235U/8GB/512GB\" -c laptop --brand Dell")]
    Inspect {
        /// Product title as scraped
        title: String,

        /// Category whose rules apply
        #[arg(long, short = 'c', value_parser = parse_category)]
        category: Category,

        /// Raw brand field, if the listing has one
        #[arg(long)]
        brand: Option<String>,

        /// Specification pairs as LABEL=VALUE (repeatable)
        #[arg(long = "spec", short = 's')]
        specs: Vec<String>,
    },
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse()
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  catalink-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.quiet, cli.log_file.as_deref()) {
        return report(e);
    }

    let result = match cli.command {
        None => {
            eprintln!("Usage: catalink <command> [options]");
            eprintln!("       catalink --help for more information");
            Err(CliError { code: EXIT_USAGE, message: String::new(), hint: None })
        }
        Some(Commands::Run { config, json, output, categories }) => {
            recon::cmd_run(config, json, output, categories)
        }
        Some(Commands::Validate { config }) => recon::cmd_validate(config),
        Some(Commands::Inspect { title, category, brand, specs }) => {
            inspect::cmd_inspect(title, category, brand, specs)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => report(e),
    }
}

fn report(CliError { code, message, hint }: CliError) -> ExitCode {
    if !message.is_empty() {
        eprintln!("error: {}", message);
    }
    if let Some(hint) = hint {
        eprintln!("hint:  {}", hint);
    }
    ExitCode::from(code)
}

/// stderr logging, `info` by default. With a log file, records go to the
/// file instead.
fn init_logging(quiet: bool, log_file: Option<&Path>) -> Result<(), CliError> {
    let default_filter = if quiet { "warn" } else { "info" };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter));

    match log_file {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(format!("catalink-{}.log", chrono::Local::now().format("%Y%m%d-%H%M%S")))
            } else {
                path.to_path_buf()
            };
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| CliError::runtime(format!("cannot open log file {}: {e}", path.display())))?;
            builder.target(Target::Pipe(Box::new(file)));
        }
        None => {
            builder.format_timestamp(None);
        }
    }

    builder.init();
    Ok(())
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_RUNTIME, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
