// tcgsync - card catalog pipeline
//
// Stages: sets, cards, enrich, sync. `run` executes all four in order.

mod cards;
mod enrich;
mod exit_codes;
mod fetch;
mod sets;
mod sync;

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tcgsync_config::{ConfigError, Settings};
use tcgsync_recon::OverridePolicy;

use exit_codes::{EXIT_CONFIG, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "tcgsync")]
#[command(about = "Fetch, normalize and reconcile card metadata")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Config file (default: ./tcgsync.toml, then the user config dir)
    #[arg(long, short = 'c', global = true, env = "TCGSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the card feed and merge it into the catalog
    #[command(after_help = "\
Examples:
  tcgsync cards
  tcgsync cards --no-override
  tcgsync -v cards --config ./tcgsync.toml")]
    Cards {
        #[command(flatten)]
        merge: MergeArgs,
    },

    /// Look up types for cards in the missing-data set
    #[command(after_help = "\
Examples:
  tcgsync enrich
  tcgsync enrich --limit 20")]
    Enrich {
        /// Look up at most N missing IDs this run
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Rebuild the cross-reference sync mapping
    #[command(after_help = "\
Examples:
  tcgsync sync
  tcgsync sync --reference ./misc/reference.json")]
    Sync {
        /// Reference export (default: first existing paths.reference entry)
        #[arg(long)]
        reference: Option<PathBuf>,
    },

    /// Rebuild the set catalog
    Sets,

    /// Run sets, cards, enrich and sync in order
    Run {
        #[command(flatten)]
        merge: MergeArgs,
    },

    /// Print the effective configuration
    Config,
}

#[derive(clap::Args)]
struct MergeArgs {
    /// Replace existing catalog entries with incoming cards
    #[arg(long = "override", conflicts_with = "no_override")]
    override_existing: bool,

    /// Keep existing catalog entries; only add new IDs
    #[arg(long)]
    no_override: bool,
}

impl MergeArgs {
    fn policy(&self, settings: &Settings) -> OverridePolicy {
        if self.override_existing {
            OverridePolicy::Override
        } else if self.no_override {
            OverridePolicy::KeepExisting
        } else {
            OverridePolicy::from_flag(settings.merge.override_existing)
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = Settings::load(cli.config.as_deref())
        .map_err(CliError::config)
        .and_then(|settings| dispatch(cli.command, &settings));

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

fn dispatch(command: Commands, settings: &Settings) -> Result<(), CliError> {
    match command {
        Commands::Cards { merge } => cards::cmd_cards(settings, merge.policy(settings)),
        Commands::Enrich { limit } => enrich::cmd_enrich(settings, limit),
        Commands::Sync { reference } => sync::cmd_sync(settings, reference),
        Commands::Sets => sets::cmd_sets(settings),
        Commands::Run { merge } => cmd_run(settings, merge.policy(settings)),
        Commands::Config => cmd_config(settings),
    }
}

#[derive(Clone, Copy)]
enum Stage {
    Sets,
    Cards,
    Enrich,
    Sync,
}

impl Stage {
    const ALL: [Stage; 4] = [Stage::Sets, Stage::Cards, Stage::Enrich, Stage::Sync];

    fn name(self) -> &'static str {
        match self {
            Stage::Sets => "sets",
            Stage::Cards => "cards",
            Stage::Enrich => "enrich",
            Stage::Sync => "sync",
        }
    }

    fn run(self, settings: &Settings, policy: OverridePolicy) -> Result<(), CliError> {
        match self {
            Stage::Sets => sets::cmd_sets(settings),
            Stage::Cards => cards::cmd_cards(settings, policy),
            Stage::Enrich => enrich::cmd_enrich(settings, None),
            Stage::Sync => sync::cmd_sync(settings, None),
        }
    }
}

/// Run every stage. A failed stage is reported and the rest still run;
/// the first failure decides the exit code.
fn cmd_run(settings: &Settings, policy: OverridePolicy) -> Result<(), CliError> {
    let started = chrono::Local::now();
    let total = Stage::ALL.len();
    let mut first_failure: Option<CliError> = None;
    let mut failed = Vec::new();

    for (idx, stage) in Stage::ALL.into_iter().enumerate() {
        let name = stage.name();
        println!("\n=== [{}/{}] {} ===", idx + 1, total, name);
        let stage_started = chrono::Local::now();
        let outcome = stage.run(settings, policy);
        let elapsed = chrono::Local::now() - stage_started;

        match outcome {
            Ok(()) => println!("=== {} done ({}ms) ===", name, elapsed.num_milliseconds()),
            Err(e) => {
                eprintln!("error: {} failed: {}", name, e);
                if let Some(ref hint) = e.hint {
                    eprintln!("hint:  {}", hint);
                }
                failed.push(name);
                if first_failure.is_none() {
                    first_failure = Some(e);
                }
            }
        }
    }

    let elapsed = chrono::Local::now() - started;
    println!(
        "\nStarted {}, finished in {}s",
        started.format("%Y-%m-%d %H:%M:%S"),
        elapsed.num_seconds(),
    );
    if !failed.is_empty() {
        println!("Failed stages: {}", failed.join(", "));
    }

    match first_failure {
        None => Ok(()),
        // Already printed per stage
        Some(e) => Err(CliError { code: e.code, message: String::new(), hint: None }),
    }
}

fn cmd_config(settings: &Settings) -> Result<(), CliError> {
    let text = settings.to_toml().map_err(CliError::config)?;
    print!("{}", text);
    println!();
    println!("# resolved paths");
    println!("# cards:   {}", settings.cards_path().display());
    println!("# missing: {}", settings.missing_path().display());
    println!("# sync:    {}", settings.sync_path().display());
    println!("# sets:    {}", settings.sets_path().display());
    println!("# foil:    {}", settings.foil_list_path().display());
    Ok(())
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Io { .. } => Some("check the --config path".to_string()),
            ConfigError::Parse(_) => Some("the config file must be valid TOML".to_string()),
            ConfigError::Validation(_) => None,
        };
        Self { code: EXIT_CONFIG, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
