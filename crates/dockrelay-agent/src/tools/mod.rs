//! Tool registration for LLM planners.
//!
//! dockrelay exposes its dispatcher as callable tools through a central
//! `ToolRegistry`. A planner reads `manifest()` as its function list and calls
//! `invoke(name, params)`.

pub mod dock_tool;

use std::collections::HashMap;
use std::sync::Arc;
use serde_json::Value;
use anyhow::Result;
use async_trait::async_trait;

use dockrelay_molecules::Dispatcher;

// ─────────────────────────────────────────────
//  Core trait
// ─────────────────────────────────────────────

/// A callable dockrelay tool.
///
/// # Minimal contract
/// - `name()` must be unique across the registry (snake_case).
/// - `description()` is surfaced to the planner as the tool docstring.
/// - `parameters_schema()` returns a JSON Schema object for the parameters.
/// - `invoke()` receives JSON params and returns JSON output.
#[async_trait]
pub trait DockrelayTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    async fn invoke(&self, params: Value) -> Result<Value>;

    /// Whether this tool reaches outside the process. Default: false.
    fn external_network(&self) -> bool { false }
}

// ─────────────────────────────────────────────
//  Tool registry
// ─────────────────────────────────────────────

/// Central registry mapping tool names → trait objects.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn DockrelayTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Register a tool. Panics if the name is already registered.
    pub fn register<T: DockrelayTool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        assert!(
            !self.tools.contains_key(&name),
            "Duplicate tool name: {name}"
        );
        self.tools.insert(name, Arc::new(tool));
    }

    /// Invoke a registered tool by name.
    pub async fn invoke(&self, name: &str, params: Value) -> Result<Value> {
        let tool = self.tools.get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {name}"))?;

        tracing::info!(
            tool = name,
            external_network = tool.external_network(),
            "Invoking tool"
        );

        tool.invoke(params).await
    }

    /// All registered tools as a JSON function manifest, sorted by name.
    pub fn manifest(&self) -> Value {
        let mut tools: Vec<&Arc<dyn DockrelayTool>> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        let tools: Vec<Value> = tools.into_iter().map(|t| {
            serde_json::json!({
                "name": t.name(),
                "description": t.description(),
                "parameters": t.parameters_schema(),
                "external_network": t.external_network(),
            })
        }).collect();
        serde_json::json!({ "tools": tools })
    }

    pub fn len(&self) -> usize { self.tools.len() }

    pub fn is_empty(&self) -> bool { self.tools.is_empty() }
}

impl Default for ToolRegistry {
    fn default() -> Self { Self::new() }
}

/// Build the default registry around a shared dispatcher.
pub fn build_default_registry(dispatcher: Arc<Dispatcher>) -> ToolRegistry {
    let mut reg = ToolRegistry::new();
    reg.register(dock_tool::DockMoleculeTool::new(dispatcher));
    tracing::info!("ToolRegistry ready with {} tools", reg.len());
    reg
}

// ─────────────────────────────────────────────
//  Tests
// ─────────────────────────────────────────────
