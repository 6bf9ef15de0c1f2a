// animal-talk-core/src/tools/listing.rs

//! Recursive listing of the project root through the platform's listing command.

use super::Tool;
use crate::errors::ToolError;
use crate::models::tools::{ToolDefinition, ToolInput, ToolParametersDefinition};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tracing::{debug, info, warn};

pub const LIST_FILES_TOOL: &str = "list_current_files";

/// Recursive listing of `root` using the platform's own listing command
/// (`dir /S` on Windows, `ls -R` elsewhere). Returns the raw stdout.
pub fn list_directory(root: &Path) -> Result<String, ToolError> {
    if !root.is_dir() {
        return Err(ToolError::Listing(format!(
            "root is not a directory: {}",
            root.display()
        )));
    }

    let expr = if cfg!(windows) {
        duct::cmd!("cmd", "/C", "dir", "/S")
    } else {
        duct::cmd!("ls", "-R")
    };
    debug!(root = %root.display(), "Listing directory");

    let output = expr
        .dir(root)
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run()
        .map_err(|e| {
            warn!(root = %root.display(), error = %e, "Failed to spawn listing command");
            ToolError::Listing(e.to_string())
        })?;

    Ok(listing_text(root, &output))
}

/// The listing is whatever the command printed. A non-zero exit (e.g. one
/// unreadable subdirectory) still yields the partial listing.
fn listing_text(root: &Path, output: &Output) -> String {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            root = %root.display(),
            exit_code = output.status.code().unwrap_or(-1),
            stderr = %stderr.trim(),
            "Listing command reported errors"
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    info!(root = %root.display(), lines = stdout.lines().count(), "Listed directory");
    stdout
}

/// Lists the fixed project root. The root comes from configuration only,
/// never from tool arguments.
#[derive(Debug, Clone)]
pub struct DirectoryLister {
    root: PathBuf,
}

impl DirectoryLister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Tool for DirectoryLister {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: LIST_FILES_TOOL.to_string(),
            description: "Lists all files under the project directory recursively, to inspect its structure."
                .to_string(),
            parameters: ToolParametersDefinition::default(),
        }
    }

    async fn invoke(&self, _input: ToolInput) -> Result<String, ToolError> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || list_directory(&root))
            .await
            .map_err(|e| ToolError::Listing(format!("listing task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ToolErrorKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_listing_includes_known_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("guinea_pig_notes.txt"), "wheek").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep_file.txt"), "").unwrap();

        let listing = list_directory(dir.path()).unwrap();
        println!("Listing:\n{}", listing);
        assert!(listing.contains("guinea_pig_notes.txt"));
        assert!(listing.contains("deep_file.txt"), "Listing should be recursive");
    }

    #[test]
    fn test_missing_root_is_listing_failure() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does_not_exist");
        let err = list_directory(&missing).unwrap_err();
        assert_eq!(err.kind(), ToolErrorKind::ListingFailure);
        assert!(err.to_string().starts_with("Failed to list files"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_keeps_partial_listing() {
        use std::os::unix::process::ExitStatusExt;
        let output = Output {
            status: std::process::ExitStatus::from_raw(1 << 8),
            stdout: b".:\nreadable.txt\nlocked\n".to_vec(),
            stderr: b"ls: cannot open directory './locked': Permission denied\n".to_vec(),
        };
        let listing = listing_text(Path::new("/srv/animal_talk"), &output);
        assert!(listing.contains("readable.txt"));
        assert!(!listing.contains("Permission denied"));
    }

    #[tokio::test]
    async fn test_tool_invoke_ignores_arguments() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "print('hi')").unwrap();
        let lister = DirectoryLister::new(dir.path());
        let listing = lister.invoke(ToolInput::default()).await.unwrap();
        assert!(listing.contains("main.py"));
        assert_eq!(lister.definition().name, LIST_FILES_TOOL);
    }
}
