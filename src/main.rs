use clap::{Parser, Subcommand};
use media_shelf::config::LIBRARY_DIR_NAME;
use media_shelf::{Indexer, LibraryConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Index a folder of e-books and comics for the library viewer
#[derive(Parser, Debug)]
#[command(name = "media-shelf", version, about)]
struct Cli {
    /// Directory holding `Library/`, `previews/` and `library-data.js`
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rescan the library and rewrite library-data.js (default)
    Refresh,
    /// Print the base directory in use
    DataPath,
    /// Create the Library folder if it is missing, then refresh
    Init,
}

#[tokio::main]
async fn main() -> ExitCode {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .init();

    let cli = Cli::parse();
    let base_dir = cli.base_dir.unwrap_or_else(LibraryConfig::default_base_dir);
    tracing::debug!(base = %base_dir.display(), "using base directory");

    match cli.command.unwrap_or(Command::Refresh) {
        Command::DataPath => {
            println!("{}", base_dir.display());
            ExitCode::SUCCESS
        }
        Command::Init => {
            let library = base_dir.join(LIBRARY_DIR_NAME);
            if !library.exists() {
                tracing::info!(path = %library.display(), "📁 Library folder not found, creating it");
                if let Err(e) = tokio::fs::create_dir_all(&library).await {
                    tracing::error!(path = %library.display(), error = %e, "could not create library folder");
                    return ExitCode::FAILURE;
                }
            }
            run_refresh(base_dir).await
        }
        Command::Refresh => run_refresh(base_dir).await,
    }
}

/// `RUST_LOG` directives when set and valid, `info` otherwise
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

async fn run_refresh(base_dir: PathBuf) -> ExitCode {
    let indexer = Indexer::new(LibraryConfig::from_base_dir(base_dir));
    let response = indexer.handle_refresh().await;

    match serde_json::to_string(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "could not serialize refresh response"),
    }

    if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
