// jlife CLI - member, inventory and event records on a local SQLite store

mod diff;
mod error;
mod exit_codes;
mod output;
mod records;
mod snapshot;
mod transfer;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use jlife_config::Settings;
use jlife_records::RecordKind;
use jlife_store::Store;

use error::CliError;
use exit_codes::EXIT_SUCCESS;
use records::{AttendanceCommands, EventCommands, InventoryCommands, MemberCommands};

#[derive(Parser)]
#[command(name = "jlife")]
#[command(about = "Member, inventory and event records with spreadsheet import, export and reconciliation")]
#[command(version)]
struct Cli {
    /// SQLite database file (overrides store.databasePath)
    #[arg(long, global = true, env = "JLIFE_DB")]
    db: Option<PathBuf>,

    /// Settings file [default: <config dir>/jlife/settings.json]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a spreadsheet of records into the store (all rows or none)
    #[command(after_help = "\
Examples:
  jlife import members.xlsx
  jlife import 2024_supplies.csv --kind inventory
  jlife import                      # pick from spreadsheets in this directory")]
    Import {
        /// Spreadsheet to import (.xlsx .xls .xlsb .ods .csv .tsv)
        file: Option<PathBuf>,

        /// Record kind; inferred from the file name when omitted
        #[arg(long)]
        kind: Option<RecordKind>,
    },

    /// Export every stored record of a kind to a spreadsheet
    #[command(after_help = "\
Examples:
  jlife export member
  jlife export event -o events.csv")]
    Export {
        /// member, inventory, event or attendance
        kind: RecordKind,

        /// Output file (.xlsx .csv .tsv) [default: <export dir>/<table>_export_<timestamp>.xlsx]
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Merge stored members into the member snapshot spreadsheet
    Snapshot {
        /// Snapshot file (overrides snapshot.path)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Compare two spreadsheets row by row on a key column
    #[command(after_help = "\
Examples:
  jlife diff old.xlsx new.xlsx --key 會員編號
  jlife diff a.csv b.csv --key id --rename-right member_id=id --ignore 備註
  jlife diff a.csv b.csv --profile recon.toml --json

Exit codes:
  0  no differences
  1  differences found
  5  duplicate keys in either file")]
    Diff(diff::DiffArgs),

    /// Show the effective settings, or write them to the settings file
    #[command(after_help = "\
Examples:
  jlife config
  jlife config --write              # fill settings.json with every key
  jlife --db /srv/jlife.db config --write")]
    Config {
        /// Save the effective settings (including --db) to the settings file
        #[arg(long)]
        write: bool,
    },

    /// Member records
    #[command(subcommand)]
    Member(MemberCommands),

    /// Inventory records
    #[command(subcommand)]
    Inventory(InventoryCommands),

    /// Events
    #[command(subcommand)]
    Event(EventCommands),

    /// Attendance marks
    #[command(subcommand)]
    Attendance(AttendanceCommands),
}

/// Resolved settings plus the database the command works on.
pub struct Context {
    pub settings: Settings,
    pub db: PathBuf,
}

impl Context {
    pub fn open_store(&self) -> Result<Store, CliError> {
        Store::open(&self.db).map_err(|e| {
            CliError::io(format!("{}: {}", self.db.display(), e))
                .with_hint("set --db or store.databasePath to a writable location")
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    init_tracing(&settings.log_level, cli.verbose);

    let db = cli.db.clone().unwrap_or_else(|| settings.database_path.clone());
    tracing::debug!(db = %db.display(), "using database");
    let ctx = Context { settings, db };

    let result = match cli.command {
        Commands::Import { file, kind } => transfer::cmd_import(&ctx, file, kind),
        Commands::Export { kind, output } => transfer::cmd_export(&ctx, kind, output),
        Commands::Snapshot { path } => snapshot::cmd_snapshot(&ctx, path),
        Commands::Diff(args) => diff::cmd_diff(args),
        Commands::Config { write } => cmd_config(&ctx, &config_path, write),
        Commands::Member(cmd) => records::run_member(&ctx, cmd),
        Commands::Inventory(cmd) => records::run_inventory(&ctx, cmd),
        Commands::Event(cmd) => records::run_event(&ctx, cmd),
        Commands::Attendance(cmd) => records::run_attendance(&ctx, cmd),
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

fn cmd_config(ctx: &Context, path: &Path, write: bool) -> Result<(), CliError> {
    let mut settings = ctx.settings.clone();
    settings.database_path = ctx.db.clone();
    if write {
        settings.save_to(path)?;
        eprintln!("wrote {}", path.display());
    }
    output::print_json(&settings)
}

/// Log to stderr so stdout carries only command output.
/// `RUST_LOG` wins; otherwise `-v` means debug, else the configured level.
fn init_tracing(level: &str, verbose: bool) {
    let fallback = if verbose { "debug" } else { level };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
