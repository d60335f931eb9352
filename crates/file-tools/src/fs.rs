//! Filesystem Operations
//!
//! Typed operations behind the tools, shared with the HTTP file endpoints.
//! Paths are used as given; nothing is sandboxed.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FileToolError, Result};

/// Kind of a directory entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One immediate child of a listed directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntryInfo {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: EntryKind,

    /// Listed path joined with `name`
    pub path: String,
}

/// Which mode `edit_text` ran in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// Existing content had `old_text` replaced
    Replaced,
    /// File written from scratch (new or truncated)
    Written,
}

/// Read a UTF-8 text file
pub async fn read_text(path: &str) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            FileToolError::FileNotFound { path: path.into() }
        } else {
            FileToolError::Read { source }
        }
    })
}

/// Immediate children of `path`, sorted by name
///
/// Symlinks are classified by their target; a dangling link is a file.
pub async fn list_entries(path: &str) -> Result<Vec<DirEntryInfo>> {
    if !exists(path).await {
        return Err(FileToolError::PathNotFound { path: path.into() });
    }

    let list_err = |source: std::io::Error| FileToolError::List { source };
    let mut reader = tokio::fs::read_dir(path).await.map_err(list_err)?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await.map_err(list_err)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let full = Path::new(path).join(&name);
        let kind = match tokio::fs::metadata(&full).await {
            Ok(meta) if meta.is_dir() => EntryKind::Directory,
            _ => EntryKind::File,
        };
        entries.push(DirEntryInfo {
            name,
            kind,
            path: full.to_string_lossy().into_owned(),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Replace `old_text` in an existing file, or write `new_text` as a whole file
///
/// Replace mode needs both an existing file and a non-empty `old_text`; every
/// occurrence is replaced and a missing `old_text` leaves the file untouched.
/// Otherwise the file is created (parents included) or truncated to
/// `new_text`. Note the truncation: an empty `old_text` against an existing
/// file overwrites it.
pub async fn edit_text(path: &str, old_text: &str, new_text: &str) -> Result<EditOutcome> {
    let edit_err = |source: std::io::Error| FileToolError::Edit { source };

    if exists(path).await && !old_text.is_empty() {
        let content = tokio::fs::read_to_string(path).await.map_err(edit_err)?;
        if !content.contains(old_text) {
            return Err(FileToolError::TextNotFound {
                needle: old_text.into(),
            });
        }

        let updated = content.replace(old_text, new_text);
        tokio::fs::write(path, updated).await.map_err(edit_err)?;
        return Ok(EditOutcome::Replaced);
    }

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(edit_err)?;
    }
    tokio::fs::write(path, new_text).await.map_err(edit_err)?;
    Ok(EditOutcome::Written)
}

async fn exists(path: &str) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_in(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_read_missing_is_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text(&path_in(&dir, "nope.txt")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_read_directory_is_generic_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text(&dir.path().to_string_lossy()).await.unwrap_err();
        assert!(matches!(err, FileToolError::Read { .. }));
    }

    #[tokio::test]
    async fn test_list_classifies_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();

        let entries = list_entries(&dir.path().to_string_lossy()).await.unwrap();

        let names: Vec<_> = entries.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("a.txt", EntryKind::File),
                ("b.txt", EntryKind::File),
                ("sub", EntryKind::Directory),
            ]
        );
        assert_eq!(entries[2].path, path_in(&dir, "sub"));
    }

    #[tokio::test]
    async fn test_list_on_file_is_list_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = path_in(&dir, "plain.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(matches!(list_entries(&file).await, Err(FileToolError::List { .. })));
    }

    #[tokio::test]
    async fn test_edit_replaces_every_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let file = path_in(&dir, "f.txt");
        std::fs::write(&file, "foo bar foo").unwrap();

        let outcome = edit_text(&file, "foo", "baz").await.unwrap();

        assert_eq!(outcome, EditOutcome::Replaced);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "baz bar baz");
    }

    #[tokio::test]
    async fn test_edit_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let file = path_in(&dir, "a/b/c.txt");

        let outcome = edit_text(&file, "ignored", "fresh").await.unwrap();

        assert_eq!(outcome, EditOutcome::Written);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "fresh");
    }
}
