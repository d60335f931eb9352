//! Read File Tool

use async_trait::async_trait;

use agent_core::{InputSchema, Tool, ToolDeclaration, ToolInput, ToolOutcome};

use crate::fs::read_text;

/// Returns a file's contents under a header line
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: "read_file".into(),
            description: "Read the contents of a file at the specified path".into(),
            input_schema: InputSchema::object().required("path", "The path to the file to read"),
        }
    }

    async fn execute(&self, input: &ToolInput) -> ToolOutcome {
        let path = input.required_str("path")?;
        let content = read_text(path).await?;
        Ok(format!("File contents of {path}:\n{content}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_header_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "line one\nline two").unwrap();
        let path = file.to_string_lossy().into_owned();

        let out = ReadFileTool
            .execute(&ToolInput::from(json!({"path": path})))
            .await
            .unwrap();

        assert_eq!(out, format!("File contents of {path}:\nline one\nline two"));
    }

    #[tokio::test]
    async fn test_missing_file_message() {
        let err = ReadFileTool
            .execute(&ToolInput::from(json!({"path": "/definitely/not/here.txt"})))
            .await
            .unwrap_err();

        assert_eq!(err.render("read_file"), "File not found: /definitely/not/here.txt");
    }
}
