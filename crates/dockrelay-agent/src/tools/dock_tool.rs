use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use dockrelay_molecules::{parse_intent, Dispatcher, DockingIntent, MoleculeInput};

use super::DockrelayTool;

/// Docks up to a handful of molecules against one target and returns the
/// user-facing reply text.
pub struct DockMoleculeTool {
    dispatcher: Arc<Dispatcher>,
}

impl DockMoleculeTool {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

/// `molecules` may be an array of SMILES/names or one free-text list.
fn intent_from_params(params: &Value) -> Result<DockingIntent> {
    let mut intent = match &params["molecules"] {
        Value::Null => DockingIntent::default(),
        Value::String(text) => parse_intent(text),
        Value::Array(items) => {
            let mut molecules = Vec::with_capacity(items.len());
            for item in items {
                let raw = item
                    .as_str()
                    .ok_or_else(|| anyhow::anyhow!("Invalid parameters: molecules must be strings"))?;
                molecules.extend(MoleculeInput::classify(raw));
            }
            DockingIntent { molecules, target: None }
        }
        _ => anyhow::bail!("Invalid parameters: molecules must be a string or an array of strings"),
    };

    if let Some(target) = params["target"].as_str().filter(|t| !t.trim().is_empty()) {
        intent.target = Some(target.to_string());
    }
    Ok(intent)
}

#[async_trait]
impl DockrelayTool for DockMoleculeTool {
    fn name(&self) -> &str {
        "dock_molecule"
    }

    fn description(&self) -> &str {
        "Docks molecules (SMILES strings or compound names) against a protein target \
         and returns a short reply with the docking score and two 3D viewer links per \
         molecule. At most five molecules per call; larger lists return a clarification."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "molecules": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "SMILES strings or compound names, docked in order."
                },
                "target": {
                    "type": "string",
                    "description": "Dockstring target name, e.g. 'DRD2' (default) or 'EGFR'. Passed through unchanged."
                }
            },
            "required": ["molecules"]
        })
    }

    async fn invoke(&self, params: Value) -> Result<Value> {
        let intent = intent_from_params(&params)?;
        let reply = self.dispatcher.dispatch(&intent).await;

        Ok(serde_json::json!({
            "reply": reply.to_string(),
            "blocks": reply.len(),
            "clarification": reply.is_clarification(),
        }))
    }

    fn external_network(&self) -> bool { true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockrelay_molecules::{DispatchSettings, DockError, DockingEndpoint, DockingRequest, DockingResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingEndpoint {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DockingEndpoint for CountingEndpoint {
        async fn dock(&self, request: &DockingRequest) -> Result<DockingResult, DockError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.smiles == "FAIL" {
                return Err(DockError::DockingFailed);
            }
            Ok(DockingResult {
                score: -9.87654,
                preview_urls: vec!["https://v/l".into(), "https://v/c".into()],
                summary_markdown: None,
                ligand_html_content: Some("<html/>".into()),
                combined_html_content: None,
            })
        }
    }

    fn tool() -> (DockMoleculeTool, Arc<AtomicUsize>) {
        let endpoint = CountingEndpoint::default();
        let calls = endpoint.calls.clone();
        let dispatcher = Dispatcher::new(Box::new(endpoint), DispatchSettings::default());
        (DockMoleculeTool::new(Arc::new(dispatcher)), calls)
    }

    #[tokio::test]
    async fn test_dock_array() {
        let (tool, calls) = tool();
        let out = tool
            .invoke(serde_json::json!({ "molecules": ["CCO", "smiles:FAIL"], "target": "EGFR" }))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(out["blocks"], 2);
        assert_eq!(
            out["reply"],
            "Docked CCO vs EGFR — score: -9.88\n\
             - [Ligand view](https://v/l)\n\
             - [Complex view](https://v/c)\n\n\
             Docking failed for this input; try another molecule or target."
        );
        assert_eq!(out["clarification"], false);
    }

    #[tokio::test]
    async fn test_dock_free_text() {
        let (tool, calls) = tool();
        let out = tool.invoke(serde_json::json!({ "molecules": "CCO CCN vs ADRB2" })).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(out["reply"].as_str().unwrap().contains("vs ADRB2"));
    }

    #[tokio::test]
    async fn test_missing_molecules_asks() {
        let (tool, calls) = tool();
        let out = tool.invoke(serde_json::json!({})).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(out["clarification"], true);
    }

    #[tokio::test]
    async fn test_too_many_molecules_asks() {
        let (tool, calls) = tool();
        let out = tool
            .invoke(serde_json::json!({ "molecules": ["C", "CC", "CCC", "CCCC", "CCCCC", "CCCCCC"] }))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(out["clarification"], true);
    }

    #[tokio::test]
    async fn test_bad_params_rejected() {
        let (tool, _) = tool();
        assert!(tool.invoke(serde_json::json!({ "molecules": 42 })).await.is_err());
        assert!(tool.invoke(serde_json::json!({ "molecules": [1, 2] })).await.is_err());
    }

    #[tokio::test]
    async fn test_invoked_through_registry() {
        let (tool, _) = tool();
        let mut reg = crate::tools::ToolRegistry::new();
        reg.register(tool);
        let out = reg.invoke("dock_molecule", serde_json::json!({ "molecules": ["CCO"] })).await.unwrap();
        assert_eq!(out["blocks"], 1);
        assert_eq!(reg.manifest()["tools"][0]["parameters"]["required"][0], "molecules");
    }
}
