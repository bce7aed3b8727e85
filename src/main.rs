//! space-proxy
//!
//! ```text
//!     Browser ──▶ http::server ──┬─ GET/HEAD ─▶ routing::resolver ──┬─ app root / assets/
//!                                │                                  └─ remote origin
//!                                └─ other ───▶ http::write ─────────┬─ login/logout (auth)
//!                                                                   └─ remote origin
//!     .tsapp (config::store) is re-read for every request.
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;

use space_proxy::auth::ChallengeAuthenticator;
use space_proxy::commands::{self, PushOptions};
use space_proxy::config::{ConfigStore, FileConfigStore};
use space_proxy::http::{AppState, HttpServer};
use space_proxy::lifecycle::{trigger_on_ctrl_c, Shutdown};
use space_proxy::observability::init_logging;
use space_proxy::remote::RemoteClient;

#[derive(Parser)]
#[command(name = "space-proxy")]
#[command(about = "Develop TiddlySpace apps locally against a live space", long_about = None)]
struct Cli {
    /// App directory to serve and push from
    #[arg(short = 'C', long, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the app and proxy the space API
    Serve,
    /// Log in and store the session credential
    Auth { user: String },
    /// Create a new app skeleton
    Init { name: String },
    /// Upload the app's files to a bag
    Push { bag: String, title: Option<String> },
    /// Like push, but delete each document first
    PushHard { bag: String, title: Option<String> },
    /// Delete one document from a bag
    Delete { bag: String, title: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let store = Arc::new(FileConfigStore::discover(&cli.dir));

    match cli.command {
        Commands::Serve => serve(store, &cli.dir).await,
        Commands::Auth { user } => {
            let password = rpassword::prompt_password(format!("Password for {user}: "))
                .context("Failed to read password")?;
            let authenticator = ChallengeAuthenticator::new(RemoteClient::new()?);
            commands::login(&authenticator, &*store, &user, &password).await?;
            println!("Logged in as {user}");
            Ok(())
        }
        Commands::Init { name } => {
            let path = commands::create_app(&cli.dir, &name)?;
            println!("Created {}", path.display());
            Ok(())
        }
        Commands::Push { bag, title } => push(&*store, &cli.dir, bag, title, false).await,
        Commands::PushHard { bag, title } => push(&*store, &cli.dir, bag, title, true).await,
        Commands::Delete { bag, title } => {
            let config = store.read()?;
            commands::delete_document(&RemoteClient::new()?, &config, &bag, &title).await?;
            println!("Deleted {title} from {bag}");
            Ok(())
        }
    }
}

async fn serve(store: Arc<FileConfigStore>, app_root: &Path) -> anyhow::Result<()> {
    let config = store.read()?;
    let client = RemoteClient::new()?;
    let authenticator = Arc::new(ChallengeAuthenticator::new(client.clone()));

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    let addr = listener.local_addr()?;

    println!("Serving http://{addr}/");
    for page in html_pages(app_root)? {
        println!("Try: http://{addr}/{page}");
    }

    let state = AppState::new(store, authenticator, client, app_root);
    let shutdown = Shutdown::new();
    trigger_on_ctrl_c(shutdown.clone());

    HttpServer::new(state).run(listener, shutdown.subscribe()).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn html_pages(app_root: &Path) -> anyhow::Result<Vec<String>> {
    let mut pages: Vec<String> = std::fs::read_dir(app_root)
        .with_context(|| format!("Failed to list {}", app_root.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".html"))
        .collect();
    pages.sort();
    Ok(pages)
}

async fn push(
    store: &dyn ConfigStore,
    app_root: &Path,
    bag: String,
    only: Option<String>,
    hard: bool,
) -> anyhow::Result<()> {
    let config = store.read()?;
    let options = PushOptions { bag, only, hard };
    let report = commands::push_assets(&RemoteClient::new()?, &config, app_root, &options).await?;

    for title in &report.pushed {
        println!("Pushed {title}");
    }
    for title in &report.skipped {
        println!("Skipped {title} (unknown content type)");
    }
    for (title, reason) in &report.failed {
        eprintln!("Failed {title}: {reason}");
    }
    anyhow::ensure!(report.is_success(), "{} item(s) failed to push", report.failed.len());
    Ok(())
}
