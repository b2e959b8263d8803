//! Whole-document JSON I/O with atomic replacement
//!
//! Targets are read and rewritten as whole JSON documents. Loading
//! distinguishes an absent file (a safe empty starting point) from an
//! unparsable one (operator content that must never be overwritten).
//! Writes go through a temporary file in the target's directory followed
//! by an atomic rename, so a crash can never leave a half-written
//! config behind.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::Result;

/// Outcome of loading a target document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedDoc {
    /// No file exists at the path.
    Absent,
    /// A file exists but could not be read or parsed as JSON.
    Invalid(String),
    /// The parsed document.
    Parsed(Value),
}

impl LoadedDoc {
    /// The parsed document, treating an absent file as an empty object.
    ///
    /// Returns `None` for `Invalid`: an unparsable file has no safe
    /// starting document.
    #[must_use]
    pub fn into_writable(self) -> Option<Value> {
        match self {
            Self::Absent => Some(Value::Object(serde_json::Map::new())),
            Self::Invalid(_) => None,
            Self::Parsed(doc) => Some(doc),
        }
    }
}

/// Load the whole JSON document at `path`.
#[must_use]
pub fn load_document(path: &Path) -> LoadedDoc {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return LoadedDoc::Absent,
        Err(err) => return LoadedDoc::Invalid(err.to_string()),
    };

    match serde_json::from_slice(&bytes) {
        Ok(doc) => LoadedDoc::Parsed(doc),
        Err(err) => LoadedDoc::Invalid(err.to_string()),
    }
}

/// Result of a successful [`write_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    /// Bytes written to disk.
    pub size: u64,
    /// SHA-256 of the written bytes, for echo recognition.
    pub digest: [u8; 32],
}

/// Serialize `doc` with 2-space indentation and atomically replace the
/// file at `path`. The temporary file lives in the target's directory
/// (rename must not cross filesystems) and is removed on every error
/// path.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem operation fails.
pub fn write_document(path: &Path, doc: &Value) -> Result<Written> {
    let parent = path
        .parent()
        .with_context(|| format!("no parent directory for {}", path.display()))?;

    let bytes = serde_json::to_vec_pretty(doc)
        .with_context(|| format!("failed to serialize document for {}", path.display()))?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
    tmp.write_all(&bytes)
        .with_context(|| format!("failed to write temporary file for {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;

    Ok(Written {
        size: bytes.len() as u64,
        digest: digest(&bytes),
    })
}

/// Recursive key-wise merge of `overlay` into `base`.
///
/// Where both sides hold objects the merge recurses; any other
/// collision is won by the overlay value.
#[must_use]
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in overlay_map {
                let combined = match merged.get(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value)
                    }
                    _ => value.clone(),
                };
                merged.insert(key.clone(), combined);
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}

/// SHA-256 digest of raw bytes.
#[must_use]
pub fn digest(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Digest of the file's current content, if the file is readable.
#[must_use]
pub fn digest_file(path: &Path) -> Option<[u8; 32]> {
    fs::read(path).ok().map(|bytes| digest(&bytes))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_load_absent_file() {
        let tmp = TempDir::new().unwrap();
        let loaded = load_document(&tmp.path().join("missing.json"));
        assert_eq!(loaded, LoadedDoc::Absent);
        assert_eq!(loaded.into_writable(), Some(json!({})));
    }

    #[test]
    fn test_load_invalid_json_is_not_absent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let loaded = load_document(&path);
        assert!(matches!(loaded, LoadedDoc::Invalid(_)));
        assert_eq!(loaded.into_writable(), None);
    }

    #[test]
    fn test_load_parsed_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"mcp": {"servers": {}}}"#).unwrap();

        let loaded = load_document(&path);
        assert_eq!(loaded, LoadedDoc::Parsed(json!({"mcp": {"servers": {}}})));
    }

    #[test]
    fn test_write_document_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.json");
        let doc = json!({"mcpServers": {"fs": {"command": "npx", "args": ["x"]}}});

        let written = write_document(&path, &doc).unwrap();

        assert_eq!(load_document(&path), LoadedDoc::Parsed(doc));
        assert_eq!(written.size, fs::metadata(&path).unwrap().len());
        assert_eq!(Some(written.digest), digest_file(&path));
    }

    #[test]
    fn test_write_document_uses_two_space_indent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.json");
        write_document(&path, &json!({"a": {"b": 1}})).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"a\""));
        assert!(content.contains("\n    \"b\""));
    }

    #[test]
    fn test_write_document_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.json");
        write_document(&path, &json!({"a": 1})).unwrap();
        write_document(&path, &json!({"a": 2})).unwrap();

        let entries: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_deep_merge_recurses_into_objects() {
        let base = json!({"servers": {"a": {"command": "x"}}, "keep": 1});
        let overlay = json!({"servers": {"b": {"command": "y"}}});

        let merged = deep_merge(&base, &overlay);

        assert_eq!(merged["servers"]["a"]["command"], "x");
        assert_eq!(merged["servers"]["b"]["command"], "y");
        assert_eq!(merged["keep"], 1);
    }

    #[test]
    fn test_deep_merge_overlay_wins_on_leaves() {
        let base = json!({"a": 1, "nested": {"x": "old"}});
        let overlay = json!({"a": 2, "nested": {"x": "new"}});

        let merged = deep_merge(&base, &overlay);

        assert_eq!(merged["a"], 2);
        assert_eq!(merged["nested"]["x"], "new");
    }

    #[test]
    fn test_deep_merge_non_object_overlay_replaces() {
        let merged = deep_merge(&json!({"a": 1}), &json!([1, 2]));
        assert_eq!(merged, json!([1, 2]));
    }

    #[test]
    fn test_digest_changes_with_content() {
        assert_eq!(digest(b"same"), digest(b"same"));
        assert_ne!(digest(b"one"), digest(b"two"));
    }
}
