use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A removable drive known to the application. The UUID is generated once
/// when the drive is registered and keys its cache database for life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drive {
    uuid: Uuid,
    pub label: String,
    pub path: PathBuf,
}

impl Drive {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            label: label.into(),
            path: path.into(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A drive is connected iff its mount path is an existing directory.
    pub fn is_connected(&self) -> bool {
        self.path.is_dir()
    }
}
