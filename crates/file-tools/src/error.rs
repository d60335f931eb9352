//! Error Types for File Tools
//!
//! Display strings are the exact text the model receives.

use thiserror::Error;

use agent_core::ToolError;

pub type Result<T> = std::result::Result<T, FileToolError>;

#[derive(Error, Debug)]
pub enum FileToolError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Error reading file: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {path}")]
    PathNotFound { path: String },

    #[error("Error listing files: {source}")]
    List {
        #[source]
        source: std::io::Error,
    },

    #[error("Text not found in file: {needle}")]
    TextNotFound { needle: String },

    #[error("Error editing file: {source}")]
    Edit {
        #[source]
        source: std::io::Error,
    },
}

impl FileToolError {
    /// The target does not exist (as opposed to any other failure)
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::PathNotFound { .. })
    }
}

impl From<FileToolError> for ToolError {
    fn from(err: FileToolError) -> Self {
        Self::Reported(err.to_string())
    }
}
