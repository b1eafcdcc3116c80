// authmap CLI - cross-reference local authority datasets

mod exit_codes;
mod link;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "authmap")]
#[command(about = "Link local authority records across datasets by canonical name")]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every dataset, cluster records and write the report and map
    #[command(after_help = "\
Examples:
  authmap run authmap.toml
  authmap run authmap.toml --html legacy/report.html --tsv maps/map2.tsv
  authmap run authmap.toml --json > linkage.json
  authmap run authmap.toml --fail-on-conflict")]
    Run {
        /// Path to the authmap TOML config
        config: PathBuf,

        /// Write the HTML report here (overrides [output].html)
        #[arg(long)]
        html: Option<PathBuf>,

        /// Write the TSV cross-reference here (overrides [output].tsv)
        #[arg(long)]
        tsv: Option<PathBuf>,

        /// Print the full result as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the full result as JSON to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit non-zero when type alias inference saw conflicting categories
        #[arg(long)]
        fail_on_conflict: bool,
    },

    /// Check a config and that every dataset loads against its descriptor
    #[command(after_help = "\
Examples:
  authmap validate authmap.toml")]
    Validate {
        /// Path to the authmap TOML config
        config: PathBuf,
    },

    /// Print the canonical key for display names (reads stdin when none given)
    #[command(after_help = "\
Examples:
  authmap normalize 'Aberdeen City Council' 'Rhondda Cynon Taff CBC'
  cut -f2 legacy/local-directgov/local-directgov.tsv | authmap normalize")]
    Normalize {
        /// Display names
        names: Vec<String>,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second init (tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            config,
            html,
            tsv,
            json,
            output,
            fail_on_conflict,
        } => link::cmd_run(link::RunOptions {
            config,
            html,
            tsv,
            json,
            output,
            fail_on_conflict,
        }),
        Commands::Validate { config } => link::cmd_validate(config),
        Commands::Normalize { names } => link::cmd_normalize(names),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
