//! The standard `mcp` dialect and the catch-all legacy fallback

use serde_json::{Map, Value};

use super::{ConfigFormat, FormatKind};

/// Plain `mcp` subtree, used by Windsurf, Roocode and other apps that
/// adopted the shared shape directly.
pub struct StandardMcp;

impl ConfigFormat for StandardMcp {
    fn detects(&self, doc: &Value) -> bool {
        doc.get("mcp").is_some()
    }

    fn extract(&self, doc: &Value) -> Value {
        doc.get("mcp")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    fn merge(&self, doc: &Value, canonical: &Value) -> Value {
        merge_as_mcp(doc, canonical)
    }

    fn name(&self) -> &'static str {
        "Standard MCP"
    }

    fn kind(&self) -> FormatKind {
        FormatKind::Standard
    }
}

/// Fallback for documents no other dialect claims, including empty
/// files about to be initialized. Extracts nothing, writes the standard
/// shape.
pub struct Legacy;

impl ConfigFormat for Legacy {
    fn detects(&self, _doc: &Value) -> bool {
        true
    }

    fn extract(&self, _doc: &Value) -> Value {
        Value::Object(Map::new())
    }

    fn merge(&self, doc: &Value, canonical: &Value) -> Value {
        merge_as_mcp(doc, canonical)
    }

    fn name(&self) -> &'static str {
        "Legacy/Empty"
    }

    fn kind(&self) -> FormatKind {
        FormatKind::Legacy
    }
}

fn merge_as_mcp(doc: &Value, canonical: &Value) -> Value {
    let mut updated = match doc {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    updated.insert("mcp".to_string(), canonical.clone());
    Value::Object(updated)
}
