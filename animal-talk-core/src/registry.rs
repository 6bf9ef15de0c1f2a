// animal-talk-core/src/registry.rs

//! Name-keyed registry of tools and dispatch by tool name.

use crate::config::ToolsConfig;
use crate::errors::ToolError;
use crate::models::tools::{ToolDefinition, ToolInput};
use crate::tools::audio::{ConvertAudioTool, Transcoder};
use crate::tools::listing::DirectoryLister;
use crate::tools::script::ScriptRunner;
use crate::tools::Tool;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tools keyed by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard tool set: file listing, script running and audio conversion.
    pub fn from_config(config: &ToolsConfig) -> Self {
        let mut registry = Self::new();
        registry.register(DirectoryLister::new(&config.project_root));
        registry.register(ScriptRunner::from_config(config));
        registry.register(ConvertAudioTool::new(
            Transcoder::from_config(config),
            &config.project_root,
        ));
        registry
    }

    /// Adds `tool`, replacing any tool with the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.definition().name;
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            warn!(tool = %name, "Replaced an already registered tool");
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub async fn invoke(&self, name: &str, input: ToolInput) -> Result<String, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        debug!(tool = %name, args = ?input.arguments, "Invoking tool");
        tool.invoke(input).await
    }
}
