//! Path translation
//!
//! Maps logical paths (relative to the configured library root) onto
//! SharePoint server-relative URLs and back again.

use crate::error::StorageError;

/// Normalize a logical path.
///
/// Backslashes become slashes, empty and `.` segments are dropped and `..`
/// is resolved. Climbing above the root is an error rather than being
/// clamped, so two different inputs never silently address the same object.
pub fn normalize(path: &str) -> Result<String, StorageError> {
    if path.chars().any(|c| c.is_control()) {
        return Err(StorageError::InvalidPath(format!(
            "control characters in path: {:?}",
            path
        )));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(StorageError::InvalidPath(format!(
                        "path is outside of the defined root: {}",
                        path
                    )));
                }
            }
            other => segments.push(other),
        }
    }

    Ok(segments.join("/"))
}

/// Last segment of a normalized path
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Everything before the last segment of a normalized path, `""` at the top
pub fn dirname(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Converts between logical paths and server-relative URLs for one library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTranslator {
    library_url: String,
}

impl PathTranslator {
    /// `site_path` is the path component of the site URL (`/sites/team`, or
    /// empty for a root site); `root` is the library folder below it.
    pub fn new(site_path: &str, root: &str) -> Result<Self, StorageError> {
        let site = normalize(site_path)?;
        let root = normalize(root)?;

        let library_url = match (site.is_empty(), root.is_empty()) {
            (true, true) => "/".to_string(),
            (true, false) => format!("/{}", root),
            (false, true) => format!("/{}", site),
            (false, false) => format!("/{}/{}", site, root),
        };

        Ok(Self { library_url })
    }

    /// Server-relative URL of the library root
    pub fn library_url(&self) -> &str {
        &self.library_url
    }

    /// Server-relative URL for a logical path
    pub fn to_server_relative(&self, path: &str) -> Result<String, StorageError> {
        let normalized = normalize(path)?;
        Ok(self.join(&normalized))
    }

    /// Logical path for a server-relative URL returned by the service.
    ///
    /// SharePoint URLs are case-insensitive and the service may echo a
    /// different casing than we sent, so the prefix match ignores ASCII case.
    pub fn to_logical(&self, server_relative: &str) -> Result<String, StorageError> {
        let trimmed = server_relative.trim_end_matches('/');
        let prefix = self.library_url.trim_end_matches('/');

        let outside = || {
            StorageError::InvalidPath(format!(
                "{} is outside of library {}",
                server_relative, self.library_url
            ))
        };

        if trimmed.len() < prefix.len()
            || !trimmed.is_char_boundary(prefix.len())
            || !trimmed.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
        {
            return Err(outside());
        }

        let rest = &trimmed[prefix.len()..];
        if !rest.is_empty() && !rest.starts_with('/') {
            return Err(outside());
        }

        normalize(rest)
    }

    /// Split a logical path into its parent folder's server-relative URL and
    /// its leaf name.
    pub fn split(&self, path: &str) -> Result<(String, String), StorageError> {
        let normalized = normalize(path)?;
        if normalized.is_empty() {
            return Err(StorageError::InvalidPath(
                "path addresses the library root".into(),
            ));
        }

        Ok((
            self.join(dirname(&normalized)),
            basename(&normalized).to_string(),
        ))
    }

    /// Logical folder paths above `path`, outermost first.
    pub fn ancestors(path: &str) -> Result<Vec<String>, StorageError> {
        let normalized = normalize(path)?;
        let segments: Vec<&str> = normalized.split('/').collect();
        Ok((1..segments.len())
            .map(|depth| segments[..depth].join("/"))
            .collect())
    }

    fn join(&self, normalized: &str) -> String {
        if normalized.is_empty() {
            self.library_url.clone()
        } else if self.library_url == "/" {
            format!("/{}", normalized)
        } else {
            format!("{}/{}", self.library_url, normalized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> PathTranslator {
        PathTranslator::new("/sites/team", "Shared Documents").unwrap()
    }

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize("//a///b/").unwrap(), "a/b");
        assert_eq!(normalize("a\\b\\c.txt").unwrap(), "a/b/c.txt");
        assert_eq!(normalize("./a/./b").unwrap(), "a/b");
        assert_eq!(normalize("a/x/../b").unwrap(), "a/b");
        assert_eq!(normalize("").unwrap(), "");
        assert_eq!(normalize("/").unwrap(), "");
    }

    #[test]
    fn normalize_rejects_escaping_the_root() {
        assert!(matches!(
            normalize("../etc/passwd"),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(normalize("a/../../b").is_err());
        assert!(normalize("a\0b").is_err());
    }

    #[test]
    fn basename_and_dirname() {
        assert_eq!(basename("a/b/c.txt"), "c.txt");
        assert_eq!(basename("c.txt"), "c.txt");
        assert_eq!(dirname("a/b/c.txt"), "a/b");
        assert_eq!(dirname("c.txt"), "");
    }

    #[test]
    fn library_url_combinations() {
        assert_eq!(translator().library_url(), "/sites/team/Shared Documents");
        assert_eq!(
            PathTranslator::new("", "Shared Documents").unwrap().library_url(),
            "/Shared Documents"
        );
        assert_eq!(PathTranslator::new("/", "").unwrap().library_url(), "/");
        assert_eq!(
            PathTranslator::new("/sites/team/", "/Docs/").unwrap().library_url(),
            "/sites/team/Docs"
        );
    }

    #[test]
    fn logical_paths_round_trip() {
        let t = translator();
        for path in ["a.txt", "dir/a.txt", "dir/nested/a b.txt", ""] {
            let server = t.to_server_relative(path).unwrap();
            assert_eq!(t.to_logical(&server).unwrap(), path);
        }
        assert_eq!(
            t.to_server_relative("//dir//a.txt").unwrap(),
            "/sites/team/Shared Documents/dir/a.txt"
        );
    }

    #[test]
    fn to_logical_ignores_case_and_trailing_slash() {
        let t = translator();
        assert_eq!(
            t.to_logical("/Sites/Team/shared documents/Dir/").unwrap(),
            "Dir"
        );
    }

    #[test]
    fn to_logical_rejects_foreign_urls() {
        let t = translator();
        assert!(t.to_logical("/sites/other/Shared Documents/a.txt").is_err());
        assert!(t.to_logical("/sites/team/Shared Documents2/a.txt").is_err());
    }

    #[test]
    fn root_site_library() {
        let t = PathTranslator::new("", "").unwrap();
        assert_eq!(t.to_server_relative("a/b").unwrap(), "/a/b");
        assert_eq!(t.to_logical("/a/b").unwrap(), "a/b");
    }

    #[test]
    fn split_gives_parent_folder_and_leaf() {
        let t = translator();
        assert_eq!(
            t.split("dir/a.txt").unwrap(),
            (
                "/sites/team/Shared Documents/dir".to_string(),
                "a.txt".to_string()
            )
        );
        assert_eq!(
            t.split("a.txt").unwrap().0,
            "/sites/team/Shared Documents"
        );
        assert!(t.split("/").is_err());
    }

    #[test]
    fn ancestors_outermost_first() {
        assert_eq!(
            PathTranslator::ancestors("a/b/c.txt").unwrap(),
            vec!["a".to_string(), "a/b".to_string()]
        );
        assert!(PathTranslator::ancestors("c.txt").unwrap().is_empty());
    }
}
