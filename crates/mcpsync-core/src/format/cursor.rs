//! Cursor's mixed `mcpServers` + `mcp` dialect

use serde_json::{Map, Value, json};
use tracing::debug;

use super::{ConfigFormat, FormatKind};

/// Cursor configs from the migration period carry both a legacy
/// top-level `mcpServers` map and the newer `mcp` section. The `mcp`
/// section is authoritative; merging removes the legacy key.
pub struct Cursor;

impl ConfigFormat for Cursor {
    fn detects(&self, doc: &Value) -> bool {
        doc.get("mcpServers").is_some() && doc.get("mcp").is_some_and(Value::is_object)
    }

    fn extract(&self, doc: &Value) -> Value {
        // Prefer the mcp section; it is the newer shape.
        if let Some(mcp) = doc.get("mcp") {
            if mcp.is_object() {
                return mcp.clone();
            }
        }

        let servers = doc
            .get("mcpServers")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        json!({
            "format": "cursor_legacy",
            "servers": servers,
        })
    }

    fn merge(&self, doc: &Value, canonical: &Value) -> Value {
        let mut updated = match doc {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        updated.insert("mcp".to_string(), canonical.clone());

        // The one intentional deletion: drop the legacy section so the
        // two copies cannot drift apart again.
        if updated.shift_remove("mcpServers").is_some() {
            debug!("removing legacy mcpServers section from Cursor config");
        }

        Value::Object(updated)
    }

    fn name(&self) -> &'static str {
        "Cursor (mixed)"
    }

    fn kind(&self) -> FormatKind {
        FormatKind::Cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_requires_both_keys() {
        assert!(Cursor.detects(&json!({"mcpServers": {}, "mcp": {}})));
        assert!(!Cursor.detects(&json!({"mcpServers": {}})));
        assert!(!Cursor.detects(&json!({"mcp": {}})));
        assert!(!Cursor.detects(&json!({"mcpServers": {}, "mcp": "string"})));
    }

    #[test]
    fn test_extract_prefers_mcp_section() {
        let doc = json!({
            "mcpServers": {"old": {}},
            "mcp": {"servers": {"new": {}}}
        });
        assert_eq!(Cursor.extract(&doc), doc["mcp"]);
    }

    #[test]
    fn test_merge_removes_legacy_key() {
        let doc = json!({
            "mcpServers": {"old": {"command": "x"}},
            "mcp": {"servers": {}},
            "telemetry": false
        });
        let canonical = json!({"servers": {"fs": {"command": "npx"}}});
        let merged = Cursor.merge(&doc, &canonical);

        assert!(merged.get("mcpServers").is_none());
        assert_eq!(merged["mcp"], canonical);
        assert_eq!(merged["telemetry"], false);
    }
}
