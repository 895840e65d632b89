mod output;
mod run;

use clap::{ArgAction, Args, Parser, Subcommand};

/// triage -- rank and triage your GitHub inbox from the terminal.
#[derive(Parser)]
#[command(name = "triage", version, about)]
struct Cli {
    #[command(flatten)]
    list: ListArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Lookback window for notifications (30m, 12h, 3d, 2w, 1mo, 1y).
    #[arg(long, default_value = "1w")]
    pub since: String,

    /// Only show one priority bucket (urgent, important, quick-win, notable, fyi).
    #[arg(short = 'p', long)]
    pub priority: Option<String>,

    /// Only show one notification reason (review_requested, mention, ...).
    #[arg(short = 'r', long)]
    pub reason: Option<String>,

    /// Only show PRs or issues.
    #[arg(short = 't', long = "type", value_parser = ["pr", "issue"])]
    pub item_type: Option<String>,

    /// Only show one repository (owner/name).
    #[arg(long)]
    pub repo: Option<String>,

    /// Output format for the non-interactive view.
    #[arg(short = 'f', long, value_parser = ["table", "json"])]
    pub format: Option<String>,

    /// Maximum number of items to display.
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Keep merged PRs in the list.
    #[arg(long, default_value_t = false)]
    pub include_merged: bool,

    /// Keep closed items in the list.
    #[arg(long, default_value_t = false)]
    pub include_closed: bool,

    /// Interactive view: true, false, or auto (TTY detection).
    #[arg(long, default_value = "auto", value_parser = ["true", "false", "auto"])]
    pub tui: String,

    /// Enrichment worker count.
    #[arg(short = 'w', long, default_value_t = 8)]
    pub workers: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, rank, and display work items (the default).
    List(ListArgs),

    /// Local cache maintenance.
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Show or edit configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Per-tier entry counts and disk usage.
    Stats,
    /// Empty every cache tier.
    Clear,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration as YAML.
    Show,
    /// Set a value by dotted path, e.g. `weights.base_scores.mention 95`.
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    triage_telemetry::logging::init_logging(cli.verbose);

    let result = match cli.command {
        None => run::run_list(cli.list).await,
        Some(Commands::List(args)) => run::run_list(args).await,
        Some(Commands::Cache { command }) => match command {
            CacheCommands::Stats => run::cache_stats().await,
            CacheCommands::Clear => run::cache_clear().await,
        },
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => run::config_show(),
            ConfigCommands::Set { key, value } => run::config_set(&key, &value),
        },
    };

    if let Err(err) = result {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
