//! `gitpadd`: the gitpad daemon.
//!
//! Serves a web editor for one file in a GitHub repository, with an admin
//! lock and an audit log kept in a local document store.
//!
//! # Usage
//!
//! ```text
//! gitpadd start                                   # start with defaults + env
//! gitpadd start -c gitpad.toml                    # start with a config file
//! gitpadd start --repo octo/notes --file-path notes.md -l 127.0.0.1:8080
//! gitpadd status                                  # show the stored lock state
//! gitpadd history -n 50                           # show recent audit records
//! ```

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gitpad_audit::AuditLog;
use gitpad_lock::LockManager;
use gitpad_remote::GithubRepository;
use gitpad_store::{DocumentStore, OfflineStore};
use gitpad_web::{WebServer, WebServerConfig};
use time::format_description::well_known::Rfc3339;
use tracing::{error, info, warn};

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "gitpadd",
    version,
    about = "Web editor for a single file in a GitHub repository"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web editor.
    Start {
        /// Access token for the GitHub API.
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Repository as `owner/name`.
        #[arg(long, env = "GITHUB_REPO")]
        repo: Option<String>,

        /// Path of the edited file inside the repository.
        #[arg(long, env = "GITHUB_FILE_PATH")]
        file_path: Option<String>,

        /// Branch to edit (defaults to the repository's default branch).
        #[arg(long, env = "GITHUB_BRANCH")]
        branch: Option<String>,

        /// Admin panel password.
        #[arg(long, env = "GITPAD_ADMIN_PASSWORD", hide_env_values = true)]
        admin_password: Option<String>,

        /// Document store URL (`memory:`, `fjall:<path>` or a path).
        #[arg(long, env = "GITPAD_STORE_URL")]
        store_url: Option<String>,

        /// Override listen address (e.g. "127.0.0.1:8080").
        #[arg(short = 'l', long, env = "GITPAD_LISTEN_ADDR")]
        listen_addr: Option<String>,
    },

    /// Show the lock state recorded in the document store.
    Status,

    /// Show recent audit records, newest first.
    History {
        /// Number of records to show.
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    match cli.command {
        Commands::Start {
            token,
            repo,
            file_path,
            branch,
            admin_password,
            store_url,
            listen_addr,
        } => {
            // CLI args (and their env vars) override config file values.
            if let Some(token) = token {
                config.github.token = token;
            }
            if let Some(repo) = repo {
                config.github.repo = repo;
            }
            if let Some(path) = file_path {
                config.github.file_path = path;
            }
            if let Some(branch) = branch {
                config.github.branch = Some(branch);
            }
            if let Some(password) = admin_password {
                config.admin.password = Some(password);
            }
            if let Some(url) = store_url {
                config.store.url = url;
            }
            if let Some(addr) = listen_addr {
                config.server.listen_addr = addr;
            }
            cmd_start(config).await
        }
        Commands::Status => cmd_status(&config).await,
        Commands::History { limit } => cmd_history(&config, limit).await,
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// -----------------------------------------------------------------------
// gitpadd start
// -----------------------------------------------------------------------

async fn cmd_start(config: CliConfig) -> Result<()> {
    info!("starting gitpadd");

    let github = config.github_config()?;
    info!(
        repo = %github.repo,
        file_path = %config.github.file_path,
        branch = github.branch.as_deref().unwrap_or("(default)"),
        listen_addr = %config.server.listen_addr,
        "editor configuration"
    );

    // --- Document store ---
    let store = open_store_or_offline(&config);

    // --- Lock + audit ---
    let lock = Arc::new(LockManager::restore(store.clone()).await);
    info!(locked = lock.is_locked(), "lock state restored");
    let audit = AuditLog::new(store);

    // --- Remote repository ---
    let repo = GithubRepository::new(github).context("failed to create GitHub client")?;

    // --- Web editor ---
    let server = WebServer::new(WebServerConfig {
        repo: Arc::new(repo),
        file_path: config.github.file_path.clone(),
        lock,
        audit,
        admin_password: config.admin.password.clone(),
        commit_message: config.commit_message(),
    });

    server
        .serve_with_shutdown(&config.server.listen_addr, shutdown_signal())
        .await
        .context("web server failed")?;

    info!("gitpadd stopped");
    Ok(())
}

/// Open the configured store, or run without one.
///
/// A store that cannot be opened at startup is replaced by an
/// [`OfflineStore`]: editing keeps working, the lock lives in memory only and
/// audit records are dropped.
fn open_store_or_offline(config: &CliConfig) -> Arc<dyn DocumentStore> {
    let opened = config
        .store_url()
        .and_then(|url| url.connect().with_context(|| format!("cannot open {url}")));
    match opened {
        Ok(store) => store,
        Err(e) => {
            error!("document store unavailable, running without persistence: {e:#}");
            Arc::new(OfflineStore)
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => warn!(%e, "failed to listen for ctrl-c, shutting down"),
    }
}

// -----------------------------------------------------------------------
// gitpadd status
// -----------------------------------------------------------------------

async fn cmd_status(config: &CliConfig) -> Result<()> {
    let url = config.store_url()?;
    let store = url.connect().map_err(|e| {
        error!(%url, %e, "failed to open document store");
        anyhow::anyhow!("cannot open document store at {url}. Is gitpadd running? ({e})")
    })?;

    println!("Store: {url}");
    match gitpad_lock::load_latest(store.as_ref()).await? {
        Some(state) => {
            let at = state
                .recorded_at
                .format(&Rfc3339)
                .unwrap_or_else(|_| state.recorded_at.to_string());
            let label = if state.locked { "locked" } else { "unlocked" };
            println!("Editing: {label} (since {at})");
        }
        None => println!("Editing: unlocked (never changed)"),
    }

    Ok(())
}

// -----------------------------------------------------------------------
// gitpadd history
// -----------------------------------------------------------------------

async fn cmd_history(config: &CliConfig, limit: usize) -> Result<()> {
    let url = config.store_url()?;
    let store = url
        .connect()
        .map_err(|e| anyhow::anyhow!("cannot open document store at {url}. Is gitpadd running? ({e})"))?;

    let records = AuditLog::new(store).recent(limit).await?;
    if records.is_empty() {
        println!("No audit records.");
        return Ok(());
    }

    for record in &records {
        let at = record
            .recorded_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| record.recorded_at.to_string());
        let detail = serde_json::to_string(&record.detail)?;
        println!("{at}  {:<5}  {detail}", record.kind);
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
