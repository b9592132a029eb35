use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use triage::cli::{self, render};
use triage::core::catalog::TreeCatalog;
use triage::core::config::{self, CliOverrides, ResolvedConfig};
use triage::core::history::HistoryStore;
use triage::core::state::App;
use triage::core::storage::FileStore;

#[derive(Parser)]
#[command(name = "triage", about = "Guided decision-tree wizard for categorizing support incidents")]
struct Args {
    /// Decision tree JSON file (bundled tree if omitted)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Directory holding saved incidents
    #[arg(long, global = true)]
    history_dir: Option<PathBuf>,

    /// Node every session starts from
    #[arg(long)]
    start_node: Option<String>,

    /// Never offer to log finished sessions
    #[arg(long)]
    no_save: bool,

    /// Show the step table under every question
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Walk the tree interactively (default)
    Run,
    /// Check the decision tree and print a summary
    Validate,
    /// Inspect or clear saved incidents
    #[command(subcommand)]
    History(HistoryCmd),
}

#[derive(Subcommand)]
enum HistoryCmd {
    /// List saved incidents
    List,
    /// Show the steps of saved incident n (1-based)
    Show { index: usize },
    /// Delete all saved incidents
    Clear,
}

impl Cmd {
    /// Commands that start a session need a valid start node; history
    /// commands do not.
    fn uses_start_node(&self) -> bool {
        matches!(self, Cmd::Run | Cmd::Validate)
    }
}

fn load_catalog(resolved: &ResolvedConfig) -> anyhow::Result<TreeCatalog> {
    let catalog = match &resolved.catalog_path {
        Some(path) => TreeCatalog::load(path)
            .with_context(|| format!("failed to load decision tree from {}", path.display()))?,
        None => TreeCatalog::bundled().context("bundled decision tree is invalid")?,
    };
    Ok(catalog)
}

fn open_history(resolved: &ResolvedConfig) -> HistoryStore {
    let store = HistoryStore::open(Box::new(FileStore::new(&resolved.history_dir)), &resolved.prefix);
    if !store.is_durable() {
        log::warn!(
            "History directory {} is not writable, saved incidents last until exit",
            resolved.history_dir.display()
        );
    }
    store
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to triage.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("triage.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().context("failed to read ~/.triage/config.toml")?;
    let overrides = CliOverrides {
        catalog: args.catalog,
        history_dir: args.history_dir,
        start_node: args.start_node,
        no_save: args.no_save,
        debug: args.debug,
    };
    let resolved = config::resolve(&file_config, &overrides);
    log::info!("Triage starting up with config: {:?}", resolved);

    let command = args.command.unwrap_or(Cmd::Run);
    let catalog = load_catalog(&resolved)?;
    if command.uses_start_node() {
        catalog.ensure_start(&resolved.start_node)?;
    }
    let stdout = io::stdout();

    match command {
        Cmd::Run => {
            let history = open_history(&resolved);
            let mut app = App::from_config(Arc::new(catalog), history, &resolved)?;
            cli::run(&mut app, io::stdin().lock(), stdout.lock())?;
        }
        Cmd::Validate => {
            println!(
                "{} nodes ({} end nodes), {} sections, start node {}",
                catalog.len(),
                catalog.terminal_count(),
                catalog.sections().len(),
                resolved.start_node
            );
        }
        Cmd::History(HistoryCmd::List) => {
            render::history_list(&mut stdout.lock(), &open_history(&resolved).load_all())?;
        }
        Cmd::History(HistoryCmd::Show { index }) => {
            let history = open_history(&resolved);
            let Some(record) = index.checked_sub(1).and_then(|i| history.get(i)) else {
                bail!("no saved incident #{}", index);
            };
            render::review(&mut stdout.lock(), &catalog, &record)?;
        }
        Cmd::History(HistoryCmd::Clear) => {
            open_history(&resolved).clear();
            println!("History cleared");
        }
    }

    log::info!("Triage shutting down");
    Ok(())
}
