// animal-talk-core/src/tools/mod.rs

//! The operations exposed as tools.
//!
//! Each one implements [`Tool`]: a definition for the dispatcher and an
//! `invoke` that turns arguments into a text result or a [`ToolError`].
//! Failures never escape as panics; callers render the error text.

pub mod audio;
pub mod listing;
pub mod process;
pub mod script;

use crate::errors::ToolError;
use crate::models::tools::{ToolDefinition, ToolInput};
use async_trait::async_trait;

/// A named operation invokable by an external dispatcher.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn invoke(&self, input: ToolInput) -> Result<String, ToolError>;
}
