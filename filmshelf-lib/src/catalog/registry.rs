use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use displaydoc::Display;
use slog::{debug, Logger};
use thiserror::Error;
use uuid::Uuid;

use super::drive::Drive;

#[derive(Debug, Error, Display)]
pub enum Error {
    /// io: {0}
    Io(#[from] io::Error),
    /// serde_json: {0}
    Json(#[from] serde_json::Error),
    /// drive label and path must not be empty
    InvalidDrive,
    /// no drive registered with uuid {0}
    UnknownDrive(Uuid),
}

/// The persisted list of known drives, stored as a JSON file. The rest of
/// the catalog only ever consumes a drive's path and connected state; this
/// type owns the lifecycle, including purging a removed drive's cache
/// database.
pub struct DriveRegistry {
    path: PathBuf,
    drives: Vec<Drive>,
    logger: Logger,
}

impl DriveRegistry {
    /// Load the registry from the given file; a missing file is an empty
    /// registry.
    pub fn load(path: impl Into<PathBuf>, logger: &Logger) -> Result<Self, Error> {
        let path = path.into();
        let drives = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(logger, "loaded drive registry"; "drives" => drives.len());
        Ok(Self {
            path,
            drives,
            logger: logger.clone(),
        })
    }

    pub fn drives(&self) -> &[Drive] {
        &self.drives
    }

    pub fn find(&self, uuid: Uuid) -> Option<&Drive> {
        self.drives.iter().find(|d| d.uuid() == uuid)
    }

    /// Find a drive by label, or by UUID when the label does not match.
    pub fn resolve(&self, key: &str) -> Option<&Drive> {
        self.drives
            .iter()
            .find(|d| d.label == key)
            .or_else(|| key.parse().ok().and_then(|uuid| self.find(uuid)))
    }

    /// Register a drive. A drive without a label or path is rejected.
    pub fn add(&mut self, drive: Drive) -> Result<(), Error> {
        if drive.label.is_empty() || drive.path.as_os_str().is_empty() {
            return Err(Error::InvalidDrive);
        }
        debug!(self.logger, "registering drive"; "label" => &drive.label);
        self.drives.push(drive);
        self.save()
    }

    /// Update a registered drive's label and mount path.
    pub fn edit(&mut self, uuid: Uuid, label: &str, path: &Path) -> Result<(), Error> {
        if label.is_empty() || path.as_os_str().is_empty() {
            return Err(Error::InvalidDrive);
        }
        let drive = self
            .drives
            .iter_mut()
            .find(|d| d.uuid() == uuid)
            .ok_or(Error::UnknownDrive(uuid))?;
        drive.label = label.to_owned();
        drive.path = path.to_owned();
        self.save()
    }

    /// Remove a drive and purge its cache database from the databases
    /// directory.
    pub fn remove(&mut self, uuid: Uuid, databases_dir: &Path) -> Result<Drive, Error> {
        let index = self
            .drives
            .iter()
            .position(|d| d.uuid() == uuid)
            .ok_or(Error::UnknownDrive(uuid))?;
        let drive = self.drives.remove(index);
        let db_path = database_path(databases_dir, &drive);
        match fs::remove_file(&db_path) {
            Ok(()) => debug!(self.logger, "purged cache database"; "path" => %db_path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.save()?;
        Ok(drive)
    }

    fn save(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.drives)?)?;
        Ok(())
    }
}

/// Path of the cache database for a drive: one file per drive UUID.
pub fn database_path(databases_dir: &Path, drive: &Drive) -> PathBuf {
    databases_dir.join(drive.uuid().to_string())
}
