//! Tool Executors
//!
//! Implementations of `agent_core::Tool` over the local filesystem.

mod edit_file;
mod list_files;
mod read_file;

pub use edit_file::EditFileTool;
pub use list_files::{ListFilesTool, render_listing};
pub use read_file::ReadFileTool;
