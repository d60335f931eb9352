//! # file-tools
//!
//! The three local capabilities the assistant exposes to the model:
//!
//! | tool | input | effect |
//! |------|-------|--------|
//! | `read_file` | `path` | file contents under a header line |
//! | `list_files` | `path` (default `.`) | sorted `[DIR]`/`[FILE]` listing |
//! | `edit_file` | `path`, `new_text`, `old_text` (default empty) | replace in place, or write the whole file |
//!
//! Failures are typed (`FileToolError`) inside the crate and become plain
//! text at the `Tool` boundary, so the model can read and react to them.

pub mod error;
pub mod executors;
pub mod fs;

use agent_core::ToolRegistry;

pub use error::{FileToolError, Result};
pub use fs::{DirEntryInfo, EditOutcome, EntryKind, edit_text, list_entries, read_text};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::executors::{EditFileTool, ListFilesTool, ReadFileTool};
}

/// Register `read_file`, `list_files` and `edit_file`, in that order
pub fn register_all(registry: &mut ToolRegistry) {
    registry.register(tools::ReadFileTool);
    registry.register(tools::ListFilesTool);
    registry.register(tools::EditFileTool);
}

/// A registry holding exactly the file tools
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_all(&mut registry);
    registry
}
