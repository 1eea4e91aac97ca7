//! Staged, checksummed program install.
//!
//! ```text
//!   program ──write──▶ Staging ──read back + SHA-256──▶ ok?
//!                                                       │
//!   Boot ──copy──▶ Backup   (failure is degraded, not fatal)
//!                                                       │
//!   Staging ──atomic rename──▶ Boot                     ▼
//! ```
//!
//! The boot slot is only ever replaced whole, by
//! [`ImageStore::promote_staged`]. Until that call succeeds the device
//! keeps booting the old program.

use log::{info, warn};

use crate::app::ports::{ImageStore, Slot, StoreError};
use crate::error::ApplyError;

/// Result of a successful install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// The previous boot image was copied to the backup slot.
    pub backup_saved: bool,
    /// Size of the installed program.
    pub bytes: usize,
}

/// SHA-256 of an image.
pub fn digest(data: &[u8]) -> [u8; 32] {
    hmac_sha256::Hash::hash(data)
}

/// True if `data` hashes to the hex digest `expected_hex` (either case).
pub fn matches_digest(data: &[u8], expected_hex: &str) -> bool {
    match hex::decode(expected_hex.trim()) {
        Ok(expected) => expected.as_slice() == digest(data).as_slice(),
        Err(_) => false,
    }
}

/// Commit `program` to the boot slot of `store`.
pub fn install<S: ImageStore>(store: &mut S, program: &str) -> Result<Applied, ApplyError> {
    let bytes = program.as_bytes();
    if bytes.is_empty() {
        return Err(ApplyError::EmptyImage);
    }

    stage(store, bytes)?;
    let backup_saved = back_up(store);

    if let Err(e) = store.promote_staged() {
        warn!("Promote staged image failed: {}", e);
        discard_staging(store);
        return Err(ApplyError::PromoteFailed);
    }

    info!(
        "Installed {} byte image (backup {})",
        bytes.len(),
        if backup_saved { "saved" } else { "MISSING" }
    );
    Ok(Applied {
        backup_saved,
        bytes: bytes.len(),
    })
}

fn stage<S: ImageStore>(store: &mut S, bytes: &[u8]) -> Result<(), ApplyError> {
    if let Err(e) = store.write(Slot::Staging, bytes) {
        warn!("Staging write failed: {}", e);
        discard_staging(store);
        return Err(ApplyError::StageWriteFailed);
    }

    let staged = match store.read(Slot::Staging) {
        Ok(staged) => staged,
        Err(e) => {
            warn!("Staging read-back failed: {}", e);
            discard_staging(store);
            return Err(ApplyError::StageWriteFailed);
        }
    };

    if digest(&staged) != digest(bytes) {
        warn!("Staged image checksum mismatch ({} of {} bytes)", staged.len(), bytes.len());
        discard_staging(store);
        return Err(ApplyError::ChecksumMismatch);
    }
    Ok(())
}

/// Copy the current boot image to the backup slot. Never blocks the install.
fn back_up<S: ImageStore>(store: &mut S) -> bool {
    let current = match store.read(Slot::Boot) {
        Ok(current) => current,
        Err(StoreError::NotFound) => {
            warn!("No boot image to back up");
            return false;
        }
        Err(e) => {
            warn!("Boot image read failed: {}; continuing without backup", e);
            return false;
        }
    };
    match store.write(Slot::Backup, &current) {
        Ok(()) => true,
        Err(e) => {
            warn!("Backup write failed: {}; continuing without backup", e);
            false
        }
    }
}

fn discard_staging<S: ImageStore>(store: &mut S) {
    if let Err(e) = store.discard(Slot::Staging) {
        warn!("Staging cleanup failed: {}", e);
    }
}
