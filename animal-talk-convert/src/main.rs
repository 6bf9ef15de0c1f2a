// animal-talk-convert/src/main.rs
use animal_talk_core::config::{find_config_file, ToolsConfig, DEFAULT_BITRATE_KBPS};
use animal_talk_core::logging::init_logging;
use animal_talk_core::tools::audio::{default_destination, ensure_ffmpeg, Transcoder};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use colored::*;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

const DEFAULT_SOURCE: &str = "attached_assets/GUINEAPIG.m4a";

/// Converts an audio recording (m4a, wav, ogg, ...) to MP3.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v INFO, -vv DEBUG, -vvv TRACE).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Source audio file.
    #[arg(default_value = DEFAULT_SOURCE)]
    input: PathBuf,

    /// Destination MP3 file. Defaults to the input path with an .mp3 extension.
    output: Option<PathBuf>,

    /// MP3 bitrate in kbps. Overrides the config file.
    #[arg(short, long)]
    bitrate: Option<u32>,

    /// Path to an AnimalTalk.toml to read the bitrate from.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Download a static ffmpeg build when none is installed.
    #[arg(long)]
    download_ffmpeg: bool,
}

fn resolve_bitrate(cli: &Cli) -> Result<u32> {
    if let Some(bitrate) = cli.bitrate {
        return Ok(bitrate);
    }
    let config_path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => find_config_file(&env::current_dir().context("Failed to get current directory")?),
    };
    match config_path {
        Some(path) => {
            debug!("Reading bitrate from {:?}", path);
            Ok(ToolsConfig::load(&path)?.audio.bitrate_kbps)
        }
        None => Ok(DEFAULT_BITRATE_KBPS),
    }
}

fn main() -> ExitCode {
    colored::control::set_override(true);
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _logging = match init_logging(cli.verbose, None) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };
    colored::control::unset_override();

    let bitrate = match resolve_bitrate(&cli) {
        Ok(0) => {
            eprintln!("{} bitrate must be greater than zero", "Error:".red());
            return ExitCode::FAILURE;
        }
        Ok(bitrate) => bitrate,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };

    if cli.download_ffmpeg {
        if let Err(e) = ensure_ffmpeg(true) {
            println!("{}", format!("✗ Error: {:#}", e).red());
            return ExitCode::FAILURE;
        }
    }

    let destination = cli.output.clone().unwrap_or_else(|| default_destination(&cli.input));
    info!(bitrate_kbps = bitrate, "Starting conversion");

    match Transcoder::new(bitrate).transcode(&cli.input, &destination) {
        Ok(report) => {
            println!("{}", report.to_string().green());
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", e.to_string().red());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["animal-talk-convert"]);
        assert_eq!(cli.input, PathBuf::from(DEFAULT_SOURCE));
        assert!(cli.output.is_none());
        assert_eq!(
            default_destination(&cli.input),
            PathBuf::from("attached_assets/GUINEAPIG.mp3")
        );
    }

    #[test]
    fn test_bitrate_flag_wins() {
        let cli = Cli::parse_from(["animal-talk-convert", "in.wav", "out.mp3", "--bitrate", "128"]);
        assert_eq!(resolve_bitrate(&cli).unwrap(), 128);
        assert_eq!(cli.output, Some(PathBuf::from("out.mp3")));
    }

    #[test]
    fn test_bitrate_from_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("AnimalTalk.toml");
        fs::write(&config_path, "project_root = \".\"\n[audio]\nbitrate_kbps = 320\n").unwrap();
        let cli = Cli::parse_from([
            "animal-talk-convert",
            "--config",
            config_path.to_str().unwrap(),
        ]);
        assert_eq!(resolve_bitrate(&cli).unwrap(), 320);
    }
}
