//! Result → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): one line per entry, `*` marks the current entry
//! - **JSON** (`--json`): `serde_json::to_string_pretty`

use std::path::Path;

use serde_json::json;
use swstack_core::{FileMetadata, StackError};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format one resolved entry.
pub fn format_metadata(metadata: &FileMetadata, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(metadata),
        OutputMode::Human => human_line(metadata, false),
    }
}

/// Format a stack's entries; `current` marks the current entry if known.
pub fn format_entries(
    entries: &[FileMetadata],
    current: Option<&FileMetadata>,
    mode: OutputMode,
) -> String {
    match mode {
        OutputMode::Json => to_json(&entries),
        OutputMode::Human if entries.is_empty() => "(empty stack)".to_string(),
        OutputMode::Human => entries
            .iter()
            .map(|e| human_line(e, current == Some(e)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Format the result of `init`.
pub fn format_created(document: &Path, schema: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(&json!({
            "document": document,
            "schema": schema,
        })),
        OutputMode::Human => format!("created {} (schema {})", document.display(), schema),
    }
}

/// Format an error.
pub fn format_error(err: &StackError, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(&json!({
            "error": err.to_string(),
            "kind": format!("{:?}", err.kind()),
        })),
        OutputMode::Human => format!("(error) {}", err),
    }
}

fn human_line(metadata: &FileMetadata, marked: bool) -> String {
    let marker = if marked { "* " } else { "  " };
    match metadata {
        FileMetadata::Schema1(m) => format!(
            "{}{}{}  {}",
            marker,
            m.version,
            if m.is_current { "  (current)" } else { "" },
            m.path.display()
        ),
        FileMetadata::Schema2(m) => format!(
            "{}{:<8} v{:<4} {}  {}{}  {}",
            marker,
            m.action,
            m.version,
            m.timestamp,
            m.hash,
            m.revision
                .as_deref()
                .map(|r| format!(" [{}]", r))
                .unwrap_or_default(),
            m.path.display()
        ),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"unserializable output: {}\"}}", e))
}
