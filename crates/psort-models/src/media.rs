//! Media files discovered in a working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// MIME types the pipeline classifies and uploads.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// A regular file inside a working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    pub path: PathBuf,
    /// Best-effort type derived from the file extension
    pub declared_mime_type: Option<String>,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>, declared_mime_type: Option<String>) -> Self {
        Self {
            path: path.into(),
            declared_mime_type,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, used as the object name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Whether the declared type is on the allow-list.
    pub fn is_eligible(&self) -> bool {
        self.declared_mime_type
            .as_deref()
            .is_some_and(|mime| ALLOWED_MIME_TYPES.contains(&mime))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligibility() {
        assert!(MediaFile::new("/w/a.jpg", Some("image/jpeg".into())).is_eligible());
        assert!(MediaFile::new("/w/b.png", Some("image/png".into())).is_eligible());
        assert!(!MediaFile::new("/w/c.txt", Some("text/plain".into())).is_eligible());
        assert!(!MediaFile::new("/w/d.mp4", Some("video/mp4".into())).is_eligible());
        assert!(!MediaFile::new("/w/e", None).is_eligible());
    }

    #[test]
    fn test_file_name() {
        let file = MediaFile::new("/tmp/psort/-abc/2024_UTC_1.jpg", None);
        assert_eq!(file.file_name(), "2024_UTC_1.jpg");
    }
}
