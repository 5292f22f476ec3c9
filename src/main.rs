//! Command-line front end for the short URL store.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL
//! suss create https://example.com/some/long/path
//!
//! # Resolve a slug
//! suss get abc234
//!
//! # Open a record for management
//! suss manage abc234 --secret <KEY>
//!
//! # List records, optionally filtered by slug
//! suss list --json
//!
//! # Check database connection
//! suss db check
//! ```
//!
//! # Environment Variables
//!
//! See [`suss::config`]. `DATABASE_URL` defaults to an in-memory database,
//! which is discarded when the command exits.
//!
//! Every command can be interrupted with Ctrl-C; an interrupted `create`
//! leaves nothing behind.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use suss::application::services::ShortUrlService;
use suss::config::{self, Config};
use suss::domain::entities::{ShortUrl, ShortUrlFilter};
use suss::infrastructure::persistence::{Database, MIGRATOR, SqliteShortUrlRepository};
use suss::utils::cancel::cancellable;

type Service = ShortUrlService<SqliteShortUrlRepository>;

/// Short URL store CLI.
#[derive(Parser)]
#[command(name = "suss")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL
    Create {
        /// URL to shorten
        url: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a slug to its long URL
    Get {
        slug: String,
    },

    /// Show a record after checking its secret key
    Manage {
        slug: String,

        /// Secret key issued at creation
        #[arg(short, long)]
        secret: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored short URLs
    List {
        /// Only show the record with this slug
        #[arg(short, long)]
        slug: Option<String>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    init_tracing(&config)?;
    config.print_summary();

    let db = Database::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.migrate(&MIGRATOR)
        .await
        .context("Failed to run migrations")?;

    let service = ShortUrlService::new(
        Arc::new(SqliteShortUrlRepository::new(db.clone())),
        config.base_url.clone(),
    );

    let result = run(cli.command, &service, &db).await;

    db.close().await;
    result
}

/// Installs the global subscriber. Logs go to stderr so `--json` output on
/// stdout stays machine-readable.
fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("Invalid RUST_LOG: '{}'", config.log_level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("cannot listen for Ctrl-C; commands are not interruptible");
        std::future::pending::<()>().await;
    }
}

async fn run(command: Commands, service: &Service, db: &Database) -> Result<()> {
    match command {
        Commands::Create { url, json } => create(service, &url, json).await,
        Commands::Get { slug } => get(service, &slug).await,
        Commands::Manage { slug, secret, json } => manage(service, &slug, &secret, json).await,
        Commands::List { slug, json } => list(service, slug, json).await,
        Commands::Db { action } => handle_db_action(action, db).await,
    }
}

/// Creates a short URL and prints its links.
///
/// The secret key is shown once; it is the only way to manage the record.
async fn create(service: &Service, url: &str, json: bool) -> Result<()> {
    let short_url = cancellable(interrupted(), service.shorten(url))
        .await
        .context("Failed to create short URL")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&short_url)?);
        return Ok(());
    }

    println!("{}", "✅ Short URL created".green().bold());
    println!();
    println!("  Short URL:  {}", service.short_url_for(&short_url).cyan());
    println!("  Target:     {}", short_url.long_url.bright_white());
    println!(
        "  Secret key: {}",
        short_url.secret_key.bright_yellow().bold()
    );
    println!("  Manage:     {}", service.manage_url_for(&short_url));
    println!();
    println!(
        "{}",
        "⚠️  Save the secret key now! It is required to manage this link."
            .red()
            .bold()
    );
    println!();

    Ok(())
}

async fn get(service: &Service, slug: &str) -> Result<()> {
    let long_url = cancellable(interrupted(), service.resolve(slug))
        .await
        .with_context(|| format!("Failed to resolve '{slug}'"))?;

    println!("{long_url}");
    Ok(())
}

async fn manage(service: &Service, slug: &str, secret: &str, json: bool) -> Result<()> {
    let short_url = cancellable(interrupted(), service.manage(slug, secret))
        .await
        .with_context(|| format!("Cannot manage '{slug}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&short_url)?);
        return Ok(());
    }

    println!("{}", "🔧 Short URL".bright_blue().bold());
    println!();
    println!("  ID:         {}", short_url.id.to_string().bright_black());
    println!("  Short URL:  {}", service.short_url_for(&short_url).cyan());
    println!("  Target:     {}", short_url.long_url.bright_white());
    println!(
        "  Created:    {}",
        short_url
            .created_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .bright_black()
    );
    println!();

    Ok(())
}

/// Lists short URLs.
///
/// # Output Format
///
/// ```text
/// 📋 Short URLs
///
///   ID    Slug     Created              Target
///   ──────────────────────────────────────────────────────────────
///   1     abc234   2024-01-15 10:30     https://example.com
/// ```
async fn list(service: &Service, slug: Option<String>, json: bool) -> Result<()> {
    let filter = ShortUrlFilter { slug };

    let (short_urls, total) = cancellable(interrupted(), service.list(filter))
        .await
        .context("Failed to list short URLs")?;

    if json {
        let body = serde_json::json!({ "items": short_urls, "total": total });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("{}", "📋 Short URLs".bright_blue().bold());
    println!();

    if short_urls.is_empty() {
        println!("{}", "  No short URLs found".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<5} {:<8} {:<20} {}",
        "ID".bright_white().bold(),
        "Slug".bright_white().bold(),
        "Created".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for short_url in &short_urls {
        print_row(short_url);
    }

    println!();
    println!("  Total: {}", total.to_string().bright_white().bold());
    println!();

    Ok(())
}

fn print_row(short_url: &ShortUrl) {
    println!(
        "  {:<5} {:<8} {:<20} {}",
        short_url.id.to_string().bright_black(),
        short_url.slug.cyan(),
        short_url
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black(),
        short_url.long_url
    );
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, db: &Database) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            cancellable(interrupted(), db.health_check())
                .await
                .context("Database check failed")?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT sqlite_version()")
                .fetch_one(db.pool())
                .await?;

            let journal_mode: String = sqlx::query_scalar("PRAGMA journal_mode")
                .fetch_one(db.pool())
                .await?;

            let short_urls: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_urls")
                .fetch_one(db.pool())
                .await?;

            println!("  SQLite:       {}", version.bright_white());
            println!("  Journal mode: {}", journal_mode.bright_white());
            println!(
                "  Short URLs:   {}",
                short_urls.to_string().bright_green().bold()
            );
            println!();
        }
    }

    Ok(())
}
