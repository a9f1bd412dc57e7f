use std::path::PathBuf;

use crate::cli::Cli;
use crate::types::LogLevel;

/// Application configuration shared by every subcommand.
#[derive(Debug)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_level: LogLevel,
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            db_path: expand_tilde(&cli.db),
            log_level: cli.log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_expand_tilde_with_home() {
        let result = expand_tilde("~/.skinsync/skins.db");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(result, home.join(".skinsync/skins.db"));
        }
    }

    #[test]
    fn test_expand_tilde_no_prefix() {
        assert_eq!(
            expand_tilde("/absolute/path.db"),
            PathBuf::from("/absolute/path.db")
        );
        assert_eq!(
            expand_tilde("relative/path.db"),
            PathBuf::from("relative/path.db")
        );
    }

    #[test]
    fn test_from_cli_default_db_lands_under_home() {
        let cli = Cli::try_parse_from(["skinsync", "status"]).unwrap();
        let config = Config::from_cli(&cli);
        assert!(config.db_path.ends_with(".skinsync/skins.db"));
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_from_cli_explicit_db_path() {
        let cli = Cli::try_parse_from(["skinsync", "--db", "/tmp/catalog.db", "status"]).unwrap();
        let config = Config::from_cli(&cli);
        assert_eq!(config.db_path, PathBuf::from("/tmp/catalog.db"));
    }
}
