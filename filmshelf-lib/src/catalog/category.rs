use std::path::{Path, PathBuf};

/// A category folder on a drive. Identity is the path relative to the drive
/// root; the display name can change without changing identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub path: String,
}

impl Category {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Absolute path of the category folder under the given drive root.
    pub fn full_path(&self, drive_root: &Path) -> PathBuf {
        drive_root.join(&self.path)
    }
}
