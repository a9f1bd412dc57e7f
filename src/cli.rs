use clap::{Args, Parser, Subcommand};

use crate::types::{LogLevel, SkinType};

#[derive(Parser, Debug)]
#[command(
    name = "skinsync",
    about = "Mirror a Winamp skin catalog to the Internet Archive"
)]
pub struct Cli {
    /// Path to the skin catalog database
    #[arg(long, default_value = "~/.skinsync/skins.db")]
    pub db: String,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload every unarchived skin to the archive
    Sync(SyncArgs),
    /// Backfill records for skins the archive already holds
    Reconcile(ReconcileArgs),
    /// Show catalog counts
    Status,
    /// Load skins from a JSON manifest into the catalog
    Import(ImportArgs),
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Skin type to upload
    #[arg(long, value_enum, default_value = "classic")]
    pub skin_type: SkinType,

    /// Concurrent uploads
    #[arg(long, default_value_t = 5)]
    pub concurrency: usize,

    /// Log what would be uploaded without staging or uploading anything
    #[arg(long)]
    pub dry_run: bool,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,
}

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Concurrent metadata fetches
    #[arg(long, default_value_t = 5)]
    pub concurrency: usize,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON manifest of skins to import
    #[arg(long)]
    pub manifest: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_defaults() {
        let cli = Cli::try_parse_from(["skinsync", "sync"]).unwrap();
        assert_eq!(cli.db, "~/.skinsync/skins.db");
        assert_eq!(cli.log_level, LogLevel::Info);
        match cli.command {
            Command::Sync(args) => {
                assert_eq!(args.skin_type, SkinType::Classic);
                assert_eq!(args.concurrency, 5);
                assert!(!args.dry_run);
                assert!(!args.no_progress_bar);
            }
            other => panic!("expected sync, got {:?}", other),
        }
    }

    #[test]
    fn test_sync_flags() {
        let cli = Cli::try_parse_from([
            "skinsync",
            "--db",
            "/tmp/skins.db",
            "--log-level",
            "debug",
            "sync",
            "--concurrency",
            "10",
            "--dry-run",
            "--no-progress-bar",
        ])
        .unwrap();
        assert_eq!(cli.db, "/tmp/skins.db");
        assert_eq!(cli.log_level, LogLevel::Debug);
        match cli.command {
            Command::Sync(args) => {
                assert_eq!(args.concurrency, 10);
                assert!(args.dry_run);
                assert!(args.no_progress_bar);
            }
            other => panic!("expected sync, got {:?}", other),
        }
    }

    #[test]
    fn test_import_requires_manifest() {
        assert!(Cli::try_parse_from(["skinsync", "import"]).is_err());

        let cli = Cli::try_parse_from(["skinsync", "import", "--manifest", "skins.json"]).unwrap();
        match cli.command {
            Command::Import(args) => assert_eq!(args.manifest, "skins.json"),
            other => panic!("expected import, got {:?}", other),
        }
    }

    #[test]
    fn test_reconcile_and_status_parse() {
        let cli = Cli::try_parse_from(["skinsync", "reconcile", "--concurrency", "3"]).unwrap();
        match cli.command {
            Command::Reconcile(args) => assert_eq!(args.concurrency, 3),
            other => panic!("expected reconcile, got {:?}", other),
        }

        let cli = Cli::try_parse_from(["skinsync", "status"]).unwrap();
        assert!(matches!(cli.command, Command::Status));
    }

    #[test]
    fn test_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["skinsync"]).is_err());
    }
}
