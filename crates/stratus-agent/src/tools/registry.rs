//! Tool Registry — name → tool mapping, built once and then shared read-only.
//!
//! Registration order is kept so that the declarations sent to the model
//! come out in the same order every time.

use std::collections::HashMap;
use std::sync::Arc;

use stratus_core::error::ToolError;
use stratus_core::types::ToolDefinition;
use tracing::info;

use super::base::Tool;

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools keyed by name, in registration order.
///
/// Mutated only while being built; wrap it in an `Arc` before handing it to
/// executors and profiles.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is already taken.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateName(name));
        }
        info!(tool = %name, "registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Look up the handler for `name`.
    pub fn handler_for(&self, name: &str) -> Result<&Arc<dyn Tool>, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declarations for the requested tools, in registration order.
    ///
    /// Fails on the first name that is not registered.
    pub fn declarations_for(&self, names: &[&str]) -> Result<Vec<ToolDefinition>, ToolError> {
        Ok(self
            .subset(names)?
            .tools
            .iter()
            .map(|t| t.to_definition())
            .collect())
    }

    /// A new registry holding only `names`, in this registry's order.
    pub fn subset(&self, names: &[&str]) -> Result<ToolRegistry, ToolError> {
        if let Some(missing) = names.iter().find(|n| !self.has(n)) {
            return Err(ToolError::UnknownTool(missing.to_string()));
        }

        let mut scoped = ToolRegistry::new();
        for tool in self.tools.iter().filter(|t| names.contains(&t.name())) {
            scoped.index.insert(tool.name().to_string(), scoped.tools.len());
            scoped.tools.push(tool.clone());
        }
        Ok(scoped)
    }

    /// The LLM-facing definitions for every registered tool.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Names of all registered tools, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
