//! Entry records
//!
//! A single file or directory as reported by a listing or metadata call.

use serde::Serialize;

use crate::path::{basename, dirname};

/// Whether an entry is a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

/// A file or directory below the adapter root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Normalized logical path
    pub path: String,
    pub basename: String,
    pub dirname: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Byte length; directories have none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Last modification, seconds since the epoch
    pub timestamp: Option<i64>,
    /// `None` when the backend does not know the content type
    pub mimetype: Option<String>,
}

impl FileEntry {
    pub fn file(path: impl Into<String>, size: Option<u64>, timestamp: Option<i64>) -> Self {
        Self::new(path.into(), EntryKind::File, size, timestamp)
    }

    pub fn dir(path: impl Into<String>, timestamp: Option<i64>) -> Self {
        Self::new(path.into(), EntryKind::Dir, None, timestamp)
    }

    fn new(path: String, kind: EntryKind, size: Option<u64>, timestamp: Option<i64>) -> Self {
        Self {
            basename: basename(&path).to_string(),
            dirname: dirname(&path).to_string(),
            path,
            kind,
            size,
            timestamp,
            mimetype: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// Extension of a file's basename, if it has one
    pub fn extension(&self) -> Option<&str> {
        if self.is_dir() {
            return None;
        }
        match self.basename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Some(ext),
            _ => None,
        }
    }

    /// Basename without its extension
    pub fn filename(&self) -> &str {
        match self.extension() {
            Some(ext) => &self.basename[..self.basename.len() - ext.len() - 1],
            None => &self.basename,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_entry_parts() {
        let entry = FileEntry::file("docs/report.final.pdf", Some(12), Some(1));
        assert_eq!(entry.basename, "report.final.pdf");
        assert_eq!(entry.dirname, "docs");
        assert_eq!(entry.extension(), Some("pdf"));
        assert_eq!(entry.filename(), "report.final");
        assert!(entry.is_file());
        assert!(entry.mimetype.is_none());
    }

    #[test]
    fn dotfiles_and_dirs_have_no_extension() {
        let dotfile = FileEntry::file(".env", Some(0), None);
        assert_eq!(dotfile.extension(), None);
        assert_eq!(dotfile.filename(), ".env");

        let dir = FileEntry::dir("a/b.d", None);
        assert_eq!(dir.extension(), None);
        assert_eq!(dir.basename, "b.d");
        assert_eq!(dir.dirname, "a");
        assert!(dir.size.is_none());
    }

    #[test]
    fn serializes_kind_as_type() {
        let json = serde_json::to_value(FileEntry::dir("x", None)).unwrap();
        assert_eq!(json["type"], "dir");
        assert!(json.get("size").is_none());
    }
}
