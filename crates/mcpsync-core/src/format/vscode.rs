//! VSCode's `mcp.servers` dialect inside `settings.json`

use serde_json::{Map, Value, json};

use super::{ConfigFormat, FormatKind};

/// VSCode nests servers under `mcp.servers` in its user `settings.json`,
/// alongside an `mcp.inputs` sequence for prompted values.
pub struct VsCode;

impl ConfigFormat for VsCode {
    fn detects(&self, doc: &Value) -> bool {
        doc.get("mcp")
            .and_then(Value::as_object)
            .is_some_and(|mcp| mcp.contains_key("servers"))
    }

    fn extract(&self, doc: &Value) -> Value {
        let empty = Map::new();
        let mcp = doc.get("mcp").and_then(Value::as_object).unwrap_or(&empty);
        let servers = mcp
            .get("servers")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let inputs = mcp.get("inputs").cloned().unwrap_or_else(|| json!([]));
        json!({
            "format": "vscode",
            "servers": servers,
            "inputs": inputs,
        })
    }

    fn merge(&self, doc: &Value, canonical: &Value) -> Value {
        let mut updated = match doc {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        let mut mcp = match updated.get("mcp").and_then(Value::as_object) {
            Some(existing) => existing.clone(),
            None => Map::new(),
        };

        if let Some(servers) = canonical.get("servers") {
            mcp.insert("servers".to_string(), servers.clone());
            if let Some(inputs) = canonical.get("inputs") {
                mcp.insert("inputs".to_string(), inputs.clone());
            }
        } else if let Some(servers) = canonical.get("mcpServers") {
            // Claude-shaped input: its mcpServers map becomes mcp.servers.
            mcp.insert("servers".to_string(), servers.clone());
        } else {
            mcp.insert("servers".to_string(), canonical.clone());
        }

        if !mcp.contains_key("inputs") {
            mcp.insert("inputs".to_string(), json!([]));
        }

        updated.insert("mcp".to_string(), Value::Object(mcp));
        Value::Object(updated)
    }

    fn name(&self) -> &'static str {
        "VSCode (mcp.servers)"
    }

    fn kind(&self) -> FormatKind {
        FormatKind::VsCode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_nested_servers_only() {
        assert!(VsCode.detects(&json!({"mcp": {"servers": {}}})));
        assert!(!VsCode.detects(&json!({"mcp": {"inputs": []}})));
        assert!(!VsCode.detects(&json!({"mcp": "not an object"})));
        assert!(!VsCode.detects(&json!({"mcpServers": {}})));
    }

    #[test]
    fn test_extract_carries_inputs() {
        let doc = json!({"mcp": {"servers": {"fs": {}}, "inputs": [{"id": "token"}]}});
        let extracted = VsCode.extract(&doc);

        assert_eq!(extracted["format"], "vscode");
        assert_eq!(extracted["servers"], json!({"fs": {}}));
        assert_eq!(extracted["inputs"], json!([{"id": "token"}]));
    }

    #[test]
    fn test_extract_defaults_inputs_to_empty() {
        let extracted = VsCode.extract(&json!({"mcp": {"servers": {}}}));
        assert_eq!(extracted["inputs"], json!([]));
    }

    #[test]
    fn test_merge_preserves_editor_settings() {
        let doc = json!({"editor.fontSize": 14, "mcp": {}});
        let canonical = json!({"servers": {"fs": {"command": "npx"}}});
        let merged = VsCode.merge(&doc, &canonical);

        assert_eq!(merged["editor.fontSize"], 14);
        assert_eq!(merged["mcp"]["servers"], canonical["servers"]);
        assert_eq!(merged["mcp"]["inputs"], json!([]));
    }

    #[test]
    fn test_merge_from_claude_shape() {
        let canonical = json!({"mcpServers": {"fs": {"command": "npx"}}});
        let merged = VsCode.merge(&json!({}), &canonical);

        assert_eq!(merged["mcp"]["servers"], canonical["mcpServers"]);
        assert_eq!(merged["mcp"]["inputs"], json!([]));
    }

    #[test]
    fn test_merge_keeps_existing_inputs() {
        let doc = json!({"mcp": {"servers": {}, "inputs": [{"id": "token"}]}});
        let canonical = json!({"servers": {"fs": {}}});
        let merged = VsCode.merge(&doc, &canonical);

        assert_eq!(merged["mcp"]["inputs"], json!([{"id": "token"}]));
    }
}
