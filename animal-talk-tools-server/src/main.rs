// animal-talk-tools-server/src/main.rs
mod server;

use animal_talk_core::config::{find_config_file, ToolsConfig};
use animal_talk_core::logging::init_logging;
use animal_talk_core::ToolRegistry;
use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use rmcp::{transport::stdio, ServiceExt};
use std::env;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::server::ToolServer;

const LOG_FILE_NAME: &str = "animal-talk-tools-server.log";

/// Animal Talk Tools: an MCP server over stdio exposing project file
/// listing, script execution and audio conversion.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v INFO, -vv DEBUG, -vvv TRACE). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Path to an AnimalTalk.toml. Searched for upwards from the current directory when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the project root that is listed and used for scripts.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Also write logs to the cache directory.
    #[arg(long)]
    log_file: bool,
}

fn load_config(cli: &Cli) -> Result<ToolsConfig> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let mut config = match &cli.config {
        Some(path) => ToolsConfig::load(path)?,
        None => match find_config_file(&cwd) {
            Some(path) => {
                info!("Found configuration file at: {:?}", path);
                ToolsConfig::load(&path)?
            }
            None => {
                info!("No configuration file found, using defaults rooted at {:?}", cwd);
                ToolsConfig::with_root(&cwd)
            }
        },
    };
    if let Some(root) = &cli.root {
        config.project_root = cwd.join(root);
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let logging = init_logging(cli.verbose, cli.log_file.then_some(LOG_FILE_NAME))?;
    if let Some(path) = &logging.log_path {
        info!("Writing logs to {}", path.display());
    }

    let config = load_config(&cli)?;
    info!(
        root = %config.project_root.display(),
        script_dir = %config.script_dir().display(),
        interpreter = %config.interpreter().display(),
        timeout_secs = config.script_timeout_secs,
        "Starting Animal Talk tools MCP server..."
    );

    let server = ToolServer::new(ToolRegistry::from_config(&config));
    let ct = CancellationToken::new();

    let shutdown = ct.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down.");
            shutdown.cancel();
        }
    });

    let service = server
        .serve_with_ct(stdio(), ct)
        .await
        .inspect_err(|e| error!("Serving error: {:?}", e))
        .map_err(|e| anyhow!("Server failed to start: {}", e))?;
    let reason = service.waiting().await?;

    info!(?reason, "Animal Talk tools MCP server stopped.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from(["animal-talk-tools-server", "-vv", "--root", "/srv/pets", "--log-file"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.root, Some(PathBuf::from("/srv/pets")));
        assert!(cli.log_file);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_explicit_config_with_root_override() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("AnimalTalk.toml");
        fs::write(&config_path, "project_root = \"app\"\nscript_timeout_secs = 3\n").unwrap();
        let cli = Cli::parse_from([
            "animal-talk-tools-server",
            "--config",
            config_path.to_str().unwrap(),
            "--root",
            dir.path().join("other").to_str().unwrap(),
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.project_root, dir.path().join("other"));
        assert_eq!(config.script_timeout_secs, 3);
    }
}
