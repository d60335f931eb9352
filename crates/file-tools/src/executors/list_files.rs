//! List Files Tool

use async_trait::async_trait;

use agent_core::{InputSchema, Tool, ToolDeclaration, ToolInput, ToolOutcome};

use crate::fs::{DirEntryInfo, EntryKind, list_entries};

/// Non-recursive, sorted directory listing
pub struct ListFilesTool;

#[async_trait]
impl Tool for ListFilesTool {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: "list_files".into(),
            description: "List all files and directories in the specified path".into(),
            input_schema: InputSchema::object().optional(
                "path",
                "The directory path to list (defaults to current directory)",
            ),
        }
    }

    async fn execute(&self, input: &ToolInput) -> ToolOutcome {
        let path = input.optional_str("path", ".")?;
        let entries = list_entries(path).await?;
        Ok(render_listing(path, &entries))
    }
}

/// `[DIR]`/`[FILE]` lines under a header, or an explicit empty marker
pub fn render_listing(path: &str, entries: &[DirEntryInfo]) -> String {
    if entries.is_empty() {
        return format!("Empty directory: {path}");
    }

    let lines: Vec<String> = entries
        .iter()
        .map(|entry| match entry.kind {
            EntryKind::Directory => format!("[DIR]  {}/", entry.name),
            EntryKind::File => format!("[FILE] {}", entry.name),
        })
        .collect();

    format!("Contents of {path}:\n{}", lines.join("\n"))
}
