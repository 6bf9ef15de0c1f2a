// animal-talk-core/src/tools/script.rs

//! Runs a named script from the script directory with the configured
//! interpreter, under a timeout.

use super::process::{run_with_timeout, ProcessResult};
use super::Tool;
use crate::config::ToolsConfig;
use crate::errors::ToolError;
use crate::models::tools::{
    ToolDefinition, ToolInput, ToolParameter, ToolParameterType, ToolParametersDefinition,
};
use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, warn};

pub const RUN_SCRIPT_TOOL: &str = "run_python_script";
pub const DEFAULT_SCRIPT_NAME: &str = "main.py";

/// Accepts only bare file names: no `..`, `/` or `\` anywhere.
///
/// Symlinks inside the script directory are not resolved.
pub fn validate_script_name(script_name: &str) -> Result<(), ToolError> {
    if script_name.contains("..") || script_name.contains('/') || script_name.contains('\\') {
        return Err(ToolError::PathRejected {
            name: script_name.to_string(),
        });
    }
    Ok(())
}

pub fn format_streams(stdout: &str, stderr: &str) -> String {
    format!("--- STDOUT ---\n{}\n\n--- STDERR ---\n{}", stdout, stderr)
}

/// Maps a finished process onto the three terminal outcomes.
pub fn classify(result: ProcessResult, timeout: Duration) -> Result<String, ToolError> {
    if result.timed_out {
        return Err(ToolError::Timeout { timeout });
    }
    if result.exit_code != 0 {
        return Err(ToolError::NonZeroExit {
            code: result.exit_code,
            stdout: result.stdout,
            stderr: result.stderr,
        });
    }
    Ok(format!(
        "✅ Script executed successfully:\n{}",
        format_streams(&result.stdout, &result.stderr)
    ))
}

#[derive(Debug, Clone)]
pub struct ScriptRunner {
    interpreter: PathBuf,
    working_dir: PathBuf,
    timeout: Duration,
}

impl ScriptRunner {
    pub fn new(interpreter: impl Into<PathBuf>, working_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            working_dir: working_dir.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(config.interpreter(), config.script_dir(), config.script_timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn run(&self, script_name: &str) -> Result<String, ToolError> {
        if let Err(e) = validate_script_name(script_name) {
            warn!(script = %script_name, "Rejected script name containing path segments");
            return Err(e);
        }

        info!(
            script = %script_name,
            interpreter = %self.interpreter.display(),
            workdir = %self.working_dir.display(),
            "Running script"
        );

        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(script_name).current_dir(&self.working_dir);

        let result = run_with_timeout(cmd, self.timeout).await.map_err(|e| {
            warn!(script = %script_name, error = %e, "Failed to run script");
            ToolError::Spawn(e)
        })?;

        info!(
            script = %script_name,
            exit_code = result.exit_code,
            timed_out = result.timed_out,
            "Script finished"
        );
        classify(result, self.timeout)
    }
}

#[async_trait]
impl Tool for ScriptRunner {
    fn definition(&self) -> ToolDefinition {
        let mut properties = BTreeMap::new();
        properties.insert(
            "script_name".to_string(),
            ToolParameter {
                param_type: ToolParameterType::String,
                description: "File name of the script to run. Must be a bare name inside the script directory."
                    .to_string(),
                default: Some(json!(DEFAULT_SCRIPT_NAME)),
            },
        );
        ToolDefinition {
            name: RUN_SCRIPT_TOOL.to_string(),
            description: format!(
                "Runs the named Python script from the project directory and returns its output. Times out after {} seconds.",
                self.timeout.as_secs()
            ),
            parameters: ToolParametersDefinition {
                properties,
                ..Default::default()
            },
        }
    }

    async fn invoke(&self, input: ToolInput) -> Result<String, ToolError> {
        let script_name = input.optional_str("script_name")?.unwrap_or(DEFAULT_SCRIPT_NAME);
        self.run(script_name).await
    }
}
