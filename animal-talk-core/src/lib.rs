// animal-talk-core/src/lib.rs

//! Core library for the Animal Talk local tooling.
//!
//! Provides the three tool operations (recursive file listing, bounded
//! script execution, MP3 conversion), the [`ToolRegistry`] that dispatches
//! to them by name, and the configuration and logging shared by the
//! binaries.

pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod registry;
pub mod tools;

pub use config::ToolsConfig;
pub use errors::{ToolError, ToolErrorKind};
pub use models::tools::{
    ToolDefinition, ToolInput, ToolParameter, ToolParameterType, ToolParametersDefinition,
};
pub use registry::ToolRegistry;
pub use tools::Tool;

pub use async_trait::async_trait;
