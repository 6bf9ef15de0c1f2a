// animal-talk-core/src/errors.rs
use std::time::Duration;
use thiserror::Error;

/// Errors produced by a tool invocation.
///
/// Every operation catches its own failures and returns one of these; nothing
/// escapes a tool as a panic. The `Display` output is the text shown to the
/// calling client.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Decoding the source or encoding the MP3 failed.
    #[error("✗ Error: {0}")]
    Transcode(String),

    /// The native listing command could not be run or reported failure.
    #[error("Failed to list files: {0}")]
    Listing(String),

    /// The script name was not a bare file name.
    #[error("Refusing to run '{name}': only bare file names inside the script directory are allowed, without path segments.")]
    PathRejected { name: String },

    /// The child did not finish in time and was killed.
    #[error("❌ Execution timed out (exceeded {} seconds).", .timeout.as_secs())]
    Timeout { timeout: Duration },

    /// The child finished with a non-zero exit code.
    #[error("❌ Script failed (Return Code {code}):\n--- STDOUT ---\n{stdout}\n\n--- STDERR ---\n{stderr}")]
    NonZeroExit {
        code: i32,
        stdout: String,
        stderr: String,
    },

    /// Spawning or waiting on the child failed.
    #[error("❌ Execution raised an error: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// Discriminant of [`ToolError`] for callers that branch on the cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    DecodeEncodeFailure,
    ListingFailure,
    PathValidationRejection,
    ProcessTimeout,
    ProcessNonZeroExit,
    ProcessSpawnFailure,
    InvalidArguments,
    UnknownTool,
}

impl ToolError {
    pub fn kind(&self) -> ToolErrorKind {
        match self {
            ToolError::Transcode(_) => ToolErrorKind::DecodeEncodeFailure,
            ToolError::Listing(_) => ToolErrorKind::ListingFailure,
            ToolError::PathRejected { .. } => ToolErrorKind::PathValidationRejection,
            ToolError::Timeout { .. } => ToolErrorKind::ProcessTimeout,
            ToolError::NonZeroExit { .. } => ToolErrorKind::ProcessNonZeroExit,
            ToolError::Spawn(_) => ToolErrorKind::ProcessSpawnFailure,
            ToolError::InvalidArguments(_) => ToolErrorKind::InvalidArguments,
            ToolError::UnknownTool(_) => ToolErrorKind::UnknownTool,
        }
    }

    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        ToolError::InvalidArguments(msg.into())
    }
}
