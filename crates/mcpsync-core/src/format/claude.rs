//! Claude Desktop's `mcpServers` dialect

use serde_json::{Map, Value, json};

use super::{ConfigFormat, FormatKind};

/// Claude Desktop stores servers under a top-level `mcpServers` key of
/// `claude_desktop_config.json`.
pub struct ClaudeDesktop;

impl ConfigFormat for ClaudeDesktop {
    fn detects(&self, doc: &Value) -> bool {
        doc.get("mcpServers").is_some()
    }

    fn extract(&self, doc: &Value) -> Value {
        let servers = doc
            .get("mcpServers")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        json!({
            "format": "claude_desktop",
            "servers": servers,
        })
    }

    fn merge(&self, doc: &Value, canonical: &Value) -> Value {
        let mut updated = match doc {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        // Canonical shape carries `servers`; a document in Claude's own
        // shape carries `mcpServers`; anything else is a raw server map.
        let servers = if let Some(servers) = canonical.get("servers") {
            servers.clone()
        } else if let Some(servers) = canonical.get("mcpServers") {
            servers.clone()
        } else {
            canonical.clone()
        };

        updated.insert("mcpServers".to_string(), servers);
        Value::Object(updated)
    }

    fn name(&self) -> &'static str {
        "Claude Desktop (mcpServers)"
    }

    fn kind(&self) -> FormatKind {
        FormatKind::ClaudeDesktop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_mcp_servers_key() {
        assert!(ClaudeDesktop.detects(&json!({"mcpServers": {}})));
        assert!(!ClaudeDesktop.detects(&json!({"mcp": {}})));
        assert!(!ClaudeDesktop.detects(&json!({})));
    }

    #[test]
    fn test_extract_wraps_servers() {
        let doc = json!({"mcpServers": {"fs": {"command": "npx"}}, "theme": "dark"});
        let extracted = ClaudeDesktop.extract(&doc);

        assert_eq!(extracted["format"], "claude_desktop");
        assert_eq!(extracted["servers"], doc["mcpServers"]);
    }

    #[test]
    fn test_merge_from_canonical_shape() {
        let doc = json!({"theme": "dark"});
        let canonical = json!({"servers": {"fs": {"command": "npx"}}});
        let merged = ClaudeDesktop.merge(&doc, &canonical);

        assert_eq!(merged["mcpServers"], canonical["servers"]);
        assert_eq!(merged["theme"], "dark");
    }

    #[test]
    fn test_merge_from_raw_server_map() {
        // A bare {name: def} map is used directly as the server map.
        let canonical = json!({"fs": {"command": "npx"}});
        let merged = ClaudeDesktop.merge(&json!({}), &canonical);

        assert_eq!(merged["mcpServers"], canonical);
    }

    #[test]
    fn test_merge_into_empty_target() {
        let canonical = json!({"servers": {"fs": {"command": "npx", "args": ["x"]}}});
        let merged = ClaudeDesktop.merge(&json!({}), &canonical);

        assert_eq!(
            merged,
            json!({"mcpServers": {"fs": {"command": "npx", "args": ["x"]}}})
        );
    }
}
