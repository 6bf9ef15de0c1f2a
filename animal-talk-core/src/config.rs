// animal-talk-core/src/config.rs

//! Configuration for the tool server and the audio converter.
//!
//! Everything that used to be a hard-coded absolute path lives here and is
//! supplied once at startup, either from `AnimalTalk.toml` or from defaults
//! rooted at a given directory.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "AnimalTalk.toml";
pub const DEFAULT_SCRIPT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BITRATE_KBPS: u32 = 192;

#[derive(Deserialize, Debug, Clone)]
pub struct ToolsConfig {
    /// Root of the listing and default working directory for scripts.
    pub project_root: PathBuf,
    #[serde(default)]
    pub script_dir: Option<PathBuf>,
    #[serde(default)]
    pub interpreter: Option<String>,
    #[serde(default = "default_script_timeout_secs")]
    pub script_timeout_secs: u64,
    #[serde(default)]
    pub audio: AudioConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AudioConfig {
    #[serde(default = "default_bitrate_kbps")]
    pub bitrate_kbps: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
        }
    }
}

fn default_script_timeout_secs() -> u64 {
    DEFAULT_SCRIPT_TIMEOUT_SECS
}

fn default_bitrate_kbps() -> u32 {
    DEFAULT_BITRATE_KBPS
}

impl ToolsConfig {
    /// Defaults rooted at `project_root`.
    pub fn with_root(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            script_dir: None,
            interpreter: None,
            script_timeout_secs: DEFAULT_SCRIPT_TIMEOUT_SECS,
            audio: AudioConfig::default(),
        }
    }

    pub fn from_toml_str(config_toml_content: &str) -> Result<ToolsConfig> {
        let config: ToolsConfig = match toml::from_str(config_toml_content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse TOML content");
                return Err(anyhow!(e))
                    .context("Failed to parse configuration TOML content. Check TOML syntax.");
            }
        };
        config.validate()?;
        tracing::debug!(root = %config.project_root.display(), "Parsed tools configuration.");
        Ok(config)
    }

    /// Reads and validates the config file at `path`. Relative directories
    /// in the file are resolved against the file's parent directory.
    pub fn load(path: &Path) -> Result<ToolsConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        if let Some(base) = path.parent() {
            config.project_root = base.join(&config.project_root);
            config.script_dir = config.script_dir.take().map(|dir| base.join(dir));
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_root.as_os_str().is_empty() {
            return Err(anyhow!("'project_root' in config content is empty."));
        }
        if self.script_timeout_secs == 0 {
            return Err(anyhow!("'script_timeout_secs' must be greater than zero."));
        }
        if self.audio.bitrate_kbps == 0 {
            return Err(anyhow!("'audio.bitrate_kbps' must be greater than zero."));
        }
        if let Some(interpreter) = &self.interpreter {
            if interpreter.trim().is_empty() {
                return Err(anyhow!("'interpreter' is set but empty."));
            }
        }
        Ok(())
    }

    pub fn script_dir(&self) -> &Path {
        self.script_dir.as_deref().unwrap_or(&self.project_root)
    }

    pub fn script_timeout(&self) -> Duration {
        Duration::from_secs(self.script_timeout_secs)
    }

    /// The interpreter scripts are run with.
    ///
    /// An explicit setting wins; otherwise the active virtual environment's
    /// python, otherwise the platform's default python on `PATH`.
    pub fn interpreter(&self) -> PathBuf {
        if let Some(explicit) = &self.interpreter {
            return PathBuf::from(explicit);
        }
        if let Some(venv) = env::var_os("VIRTUAL_ENV") {
            let venv = PathBuf::from(venv);
            let candidate = if cfg!(windows) {
                venv.join("Scripts").join("python.exe")
            } else {
                venv.join("bin").join("python")
            };
            if candidate.is_file() {
                return candidate;
            }
        }
        PathBuf::from(if cfg!(windows) { "python" } else { "python3" })
    }
}

/// Walks up from `start` looking for [`CONFIG_FILENAME`].
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}
