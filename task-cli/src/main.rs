use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use task_cli::{Config, Status, StoreError, TaskStore, display};
use tracing::{Level, debug};

/// Track personal tasks in a local JSON file
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Task file to use instead of the configured one
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Log store activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Add a new task
    Add { description: String },
    /// Change the description of a task
    Update { id: u32, description: String },
    /// Delete a task
    Delete { id: u32 },
    /// Change the status of a task (pending, in_progress, done)
    Status { id: u32, status: String },
    /// List all tasks
    List,
    /// List pending tasks
    ListPending,
    /// List tasks in progress
    ListInProgress,
    /// List done tasks
    ListDone,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .init();

    let Some(command) = args.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = Config::load()?.with_file(args.file);
    let mut store = TaskStore::load(config.file);
    debug!(path = %store.path().display(), outcome = ?store.load_outcome(), "store loaded");

    println!("{}", run(&mut store, command)?);
    Ok(())
}

/// Performs one command against the store and renders its outcome.
///
/// Only failures to persist are returned as errors; a missing task or a bad
/// status becomes a message for the user.
fn run(store: &mut TaskStore, command: Commands) -> Result<String, StoreError> {
    let result = match command {
        Commands::Add { description } => store.add(description).map(|task| display::added(&task)),
        Commands::Update { id, description } => store
            .update_description(id, description)
            .map(|task| display::updated(&task)),
        Commands::Delete { id } => store.delete(id).map(|task| display::deleted(&task)),
        Commands::Status { id, status } => store
            .update_status(id, &status)
            .map(|task| display::status_changed(&task)),
        Commands::List => Ok(display::render_all(store.list_all())),
        Commands::ListPending => Ok(list_with_status(store, Status::Pending)),
        Commands::ListInProgress => Ok(list_with_status(store, Status::InProgress)),
        Commands::ListDone => Ok(list_with_status(store, Status::Done)),
    };

    match result {
        Err(e) if !e.is_fatal() => Ok(display::error(&e)),
        other => other,
    }
}

fn list_with_status(store: &TaskStore, status: Status) -> String {
    display::render_filtered(status, &store.list_by_status(status))
}
