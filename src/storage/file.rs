//! Directory-backed slot store.
//!
//! Each slot is a file `<dir>/<slot>.lbx`.  Writes are **atomic**: the
//! value goes to a temp file in the same directory which is then renamed
//! over the target, so readers never see a half-written slot.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Slot, SlotStore};
use crate::errors::Result;

/// File extension used for slot files (and backups).
pub const SLOT_EXTENSION: &str = "lbx";

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the file backing `slot`.
    pub fn slot_path(&self, slot: Slot) -> PathBuf {
        self.dir
            .join(format!("{}.{SLOT_EXTENSION}", slot.as_str()))
    }
}

impl SlotStore for FileStore {
    fn get(&self, slot: Slot) -> Result<Option<String>> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, slot: Slot, value: &str) -> Result<()> {
        let path = self.slot_path(slot);
        let tmp_path = self.dir.join(format!(".{}.tmp", slot.as_str()));

        fs::write(&tmp_path, value)?;

        // Owner-only permissions before the file becomes visible.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<()> {
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
