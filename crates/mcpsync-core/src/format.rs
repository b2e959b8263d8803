//! MCP configuration dialect detection, extraction, and merging
//!
//! Each supported application stores its MCP servers in a different JSON
//! shape. A [`ConfigFormat`] projects that shape into the canonical
//! `{servers, ...}` mapping and merges a canonical mapping back into an
//! existing document without disturbing unrelated keys.

mod claude;
mod cursor;
mod standard;
mod vscode;

use serde_json::Value;

pub use claude::ClaudeDesktop;
pub use cursor::Cursor;
pub use standard::{Legacy, StandardMcp};
pub use vscode::VsCode;

/// Dialect discriminant, also the preferred on-disk dialect of a known
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// Claude Desktop's top-level `mcpServers` mapping
    ClaudeDesktop,
    /// VSCode's nested `mcp.servers` section inside `settings.json`
    VsCode,
    /// Cursor's mixed `mcpServers` + `mcp` shape
    Cursor,
    /// The plain `mcp` subtree used by Windsurf, Roocode and others
    Standard,
    /// Fallback for empty or unrecognized documents
    Legacy,
}

impl FormatKind {
    /// The adapter implementing this dialect.
    #[must_use]
    pub fn adapter(self) -> &'static dyn ConfigFormat {
        match self {
            Self::ClaudeDesktop => &ClaudeDesktop,
            Self::VsCode => &VsCode,
            Self::Cursor => &Cursor,
            Self::Standard => &StandardMcp,
            Self::Legacy => &Legacy,
        }
    }

    /// Preferred *write* dialect for a known application name.
    ///
    /// Distinct from detection: an app is always written in its own
    /// dialect no matter what dialect its existing file happens to be
    /// in. Unknown names get the standard dialect.
    #[must_use]
    pub fn for_app(app_name: &str) -> Self {
        match app_name {
            "Claude" => Self::ClaudeDesktop,
            "VSCode" => Self::VsCode,
            "Cursor" => Self::Cursor,
            _ => Self::Standard,
        }
    }
}

/// One MCP configuration dialect.
///
/// Implementations are stateless. `extract` and `merge` never mutate
/// their inputs; `merge` returns a new document that preserves every
/// key outside the dialect's MCP subtree.
pub trait ConfigFormat: Send + Sync {
    /// Whether this dialect matches the document. Structural check over
    /// keys only, no value validation.
    fn detects(&self, doc: &Value) -> bool;

    /// Project the dialect's MCP subtree into the canonical
    /// `{servers, ...}` shape.
    fn extract(&self, doc: &Value) -> Value;

    /// Return a copy of `doc` with its MCP keys replaced from
    /// `canonical`, leaving unrelated keys untouched.
    fn merge(&self, doc: &Value, canonical: &Value) -> Value;

    /// Stable human-readable label for reports.
    fn name(&self) -> &'static str;

    /// Discriminant for this dialect.
    fn kind(&self) -> FormatKind;
}

/// Probe order for dialect detection.
///
/// Most composite shapes go first: Cursor carries both `mcpServers` and
/// an `mcp` object and must win over the single-key dialects; VSCode's
/// nested `mcp.servers` must win over the bare `mcp` check. `Legacy`
/// matches anything, so the probe always terminates.
pub const DETECTION_ORDER: [&dyn ConfigFormat; 5] =
    [&Cursor, &VsCode, &ClaudeDesktop, &StandardMcp, &Legacy];

/// Detect the dialect of a raw config document.
#[must_use]
pub fn detect_format(doc: &Value) -> &'static dyn ConfigFormat {
    DETECTION_ORDER
        .iter()
        .copied()
        .find(|format| format.detects(doc))
        .unwrap_or(&Legacy)
}
