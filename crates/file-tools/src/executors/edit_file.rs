//! Edit File Tool
//!
//! Two modes, picked by whether the file exists and `old_text` is non-empty:
//! in-place replacement, or writing `new_text` as the whole file.

use async_trait::async_trait;

use agent_core::{InputSchema, Tool, ToolDeclaration, ToolInput, ToolOutcome};

use crate::fs::{EditOutcome, edit_text};

pub struct EditFileTool;

#[async_trait]
impl Tool for EditFileTool {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: "edit_file".into(),
            description: "Edit a file by replacing old_text with new_text. Creates the file if it doesn't exist."
                .into(),
            input_schema: InputSchema::object()
                .required("path", "The path to the file to edit")
                .optional(
                    "old_text",
                    "The text to search for and replace (leave empty to create new file)",
                )
                .required("new_text", "The text to replace old_text with"),
        }
    }

    async fn execute(&self, input: &ToolInput) -> ToolOutcome {
        let path = input.required_str("path")?;
        let old_text = input.optional_str("old_text", "")?;
        let new_text = input.required_str("new_text")?;

        let message = match edit_text(path, old_text, new_text).await? {
            EditOutcome::Replaced => format!("Successfully edited {path}"),
            EditOutcome::Written => {
                if !old_text.is_empty() {
                    tracing::debug!(path, "old_text given for a missing file; created instead");
                }
                format!("Successfully created {path}")
            }
        };
        Ok(message)
    }
}
