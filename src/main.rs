//! skinsync — mirrors a local catalog of classic Winamp skins to the
//! Internet Archive.
//!
//! The catalog keys skins by md5. `sync` uploads every classic skin
//! without an archive record via the `ia` CLI, minting collision-free
//! identifiers; `reconcile` walks the archive's own index and backfills
//! records for items that are already up, so they are never uploaded
//! twice.

#![warn(clippy::all)]

mod archive;
mod catalog;
mod cli;
mod config;
mod sync;
mod types;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use archive::{ArchiveClient, IaUploader};
use catalog::{CatalogDb, SkinManifestEntry, SqliteCatalog};
use config::Config;
use sync::stage::HttpStager;

fn http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("skinsync/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Open the catalog for commands that refuse to start from nothing.
async fn open_existing_catalog(path: &Path) -> anyhow::Result<SqliteCatalog> {
    if !path.exists() {
        anyhow::bail!(
            "No catalog database at {}. Run `skinsync import` first.",
            path.display()
        );
    }
    Ok(SqliteCatalog::open(path).await?)
}

/// Run the sync command.
async fn run_sync(config: &Config, args: cli::SyncArgs) -> anyhow::Result<()> {
    let catalog = open_existing_catalog(&config.db_path).await?;

    let stager = HttpStager::new(http_client()?);
    let uploader = IaUploader::new();

    let options = sync::SyncOptions {
        skin_type: args.skin_type,
        concurrency: args.concurrency,
        dry_run: args.dry_run,
        no_progress_bar: args.no_progress_bar,
    };

    tracing::info!(
        skin_type = options.skin_type.as_str(),
        concurrency = options.concurrency,
        dry_run = options.dry_run,
        "Starting sync"
    );
    let report = sync::run_sync(&catalog, &stager, &uploader, &options).await?;

    if report.failed() > 0 {
        anyhow::bail!("{} of {} uploads failed", report.failed(), report.eligible);
    }

    Ok(())
}

/// Run the reconcile command.
async fn run_reconcile(config: &Config, args: cli::ReconcileArgs) -> anyhow::Result<()> {
    let catalog = open_existing_catalog(&config.db_path).await?;
    let archive = ArchiveClient::new(http_client()?);

    let options = sync::ReconcileOptions {
        concurrency: args.concurrency,
        no_progress_bar: args.no_progress_bar,
    };

    tracing::info!(concurrency = options.concurrency, "Starting reconcile");
    sync::run_reconcile(&catalog, &archive, &options).await?;

    Ok(())
}

/// Run the status command.
async fn run_status(config: &Config) -> anyhow::Result<()> {
    if !config.db_path.exists() {
        println!("No catalog database found at {}", config.db_path.display());
        println!("Run `skinsync import` first to create it.");
        return Ok(());
    }

    let catalog = SqliteCatalog::open(&config.db_path).await?;
    let summary = catalog.summary().await?;

    println!("Catalog: {}", config.db_path.display());
    println!();
    println!("Skins:");
    println!("  Total:    {}", summary.total_skins);
    println!("  Classic:  {}", summary.classic);
    println!("  Modern:   {}", summary.modern);
    println!("  Archived: {}", summary.archived);
    println!();
    println!("Pending classic uploads: {}", summary.pending_classic);

    Ok(())
}

/// Run the import command.
async fn run_import(config: &Config, args: cli::ImportArgs) -> anyhow::Result<()> {
    if let Some(parent) = config.db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let catalog = SqliteCatalog::open(&config.db_path).await?;

    let raw = tokio::fs::read_to_string(&args.manifest)
        .await
        .with_context(|| format!("Failed to read manifest {}", args.manifest))?;
    let entries: Vec<SkinManifestEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse manifest {}", args.manifest))?;

    let mut imported = 0u64;
    let mut duplicates = 0u64;
    let mut invalid = 0u64;

    for entry in entries {
        if !catalog::types::valid_md5(&entry.md5) {
            tracing::warn!(md5 = %entry.md5, filename = %entry.filename, "Skipping entry with invalid md5");
            invalid += 1;
            continue;
        }
        if catalog.insert_skin(&entry.into_skin()).await? {
            imported += 1;
        } else {
            duplicates += 1;
        }
    }

    println!("Import complete:");
    println!("  Imported:   {}", imported);
    println!("  Duplicates: {}", duplicates);
    if invalid > 0 {
        println!("  Invalid:    {}", invalid);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let filter = match cli.log_level {
        types::LogLevel::Debug => "debug",
        types::LogLevel::Info => "info",
        types::LogLevel::Error => "error",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let config = Config::from_cli(&cli);

    match cli.command {
        cli::Command::Sync(args) => run_sync(&config, args).await,
        cli::Command::Reconcile(args) => run_reconcile(&config, args).await,
        cli::Command::Status => run_status(&config).await,
        cli::Command::Import(args) => run_import(&config, args).await,
    }
}
