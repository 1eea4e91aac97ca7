//! Filesystem image store.
//!
//! Implements [`ImageStore`] with one file per slot. On the device the
//! files live on a SPIFFS partition mounted at [`MOUNT_POINT`]; on the host
//! any directory works.
//!
//! `promote_staged` is a `rename`, which replaces the boot file in one
//! step. SPIFFS refuses to rename over an existing file, so there the boot
//! file is removed first and the backup slot covers the gap.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ImageStore, Slot, StoreError};
use crate::config::OtaConfig;

/// VFS path the storage partition is mounted at.
pub const MOUNT_POINT: &str = "/storage";

pub struct FsImageStore {
    boot: PathBuf,
    backup: PathBuf,
    staging: PathBuf,
}

impl FsImageStore {
    pub fn new(boot: impl Into<PathBuf>, backup: impl Into<PathBuf>, staging: impl Into<PathBuf>) -> Self {
        Self {
            boot: boot.into(),
            backup: backup.into(),
            staging: staging.into(),
        }
    }

    pub fn from_config(config: &OtaConfig) -> Self {
        Self::new(&config.boot_path, &config.backup_path, &config.staging_path)
    }

    pub fn path(&self, slot: Slot) -> &Path {
        match slot {
            Slot::Boot => &self.boot,
            Slot::Backup => &self.backup,
            Slot::Staging => &self.staging,
        }
    }
}

fn store_error(e: &io::Error) -> StoreError {
    match e.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound,
        io::ErrorKind::StorageFull => StoreError::Full,
        _ => StoreError::IoError,
    }
}

impl ImageStore for FsImageStore {
    fn read(&self, slot: Slot) -> Result<Vec<u8>, StoreError> {
        fs::read(self.path(slot)).map_err(|e| store_error(&e))
    }

    fn write(&mut self, slot: Slot, data: &[u8]) -> Result<(), StoreError> {
        let path = self.path(slot);
        let result = fs::File::create(path).and_then(|mut f| {
            f.write_all(data)?;
            f.sync_all()
        });
        result.map_err(|e| {
            warn!("Write {} failed: {}", path.display(), e);
            store_error(&e)
        })
    }

    fn discard(&mut self, slot: Slot) -> Result<(), StoreError> {
        match fs::remove_file(self.path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(store_error(&e)),
        }
    }

    fn promote_staged(&mut self) -> Result<(), StoreError> {
        if !self.staging.exists() {
            return Err(StoreError::NotFound);
        }
        if let Err(first) = fs::rename(&self.staging, &self.boot) {
            if !self.boot.exists() {
                return Err(store_error(&first));
            }
            warn!("Rename over boot image refused ({}); removing it first", first);
            fs::remove_file(&self.boot).map_err(|e| store_error(&e))?;
            fs::rename(&self.staging, &self.boot).map_err(|e| store_error(&e))?;
        }
        info!("Promoted {} -> {}", self.staging.display(), self.boot.display());
        Ok(())
    }
}

/// Register the SPIFFS storage partition at [`MOUNT_POINT`].
#[cfg(target_os = "espidf")]
pub fn mount_storage() -> Result<(), StoreError> {
    use esp_idf_svc::sys::*;

    let base_path = c"/storage";
    let conf = esp_vfs_spiffs_conf_t {
        base_path: base_path.as_ptr(),
        partition_label: core::ptr::null(),
        max_files: 4,
        format_if_mount_failed: true,
    };
    // SAFETY: called once from the main task before any file access; the
    // config and its strings outlive the call.
    let ret = unsafe { esp_vfs_spiffs_register(&conf) };
    if ret != ESP_OK {
        warn!("SPIFFS mount failed: {}", ret);
        return Err(StoreError::IoError);
    }
    info!("SPIFFS mounted at {}", MOUNT_POINT);
    Ok(())
}
