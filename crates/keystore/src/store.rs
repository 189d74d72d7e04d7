//! File system persistence for key pairs.
//!
//! Writes are plain whole-file writes with owner-only permissions; there is
//! no locking and no atomic rename, so concurrent writers to the same path
//! race and the last writer wins.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::keypair::{Ed25519KeyPair, KeyRecord};
use crate::paths::key_path;

impl Ed25519KeyPair {
    /// Serialize the key pair and write it to `path` with owner-only
    /// permissions. The parent directory must already exist; OS errors are
    /// propagated unchanged.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_vec(&self.to_record())?;
        write_private(path, &data)?;
        debug!("Wrote key pair for {} to {:?}", self.account_id(), path);
        Ok(())
    }

    /// Write the key pair to the conventional store location for
    /// `network_id` under `base_dir` and return the path written.
    pub fn write(&self, base_dir: &Path, network_id: &str) -> Result<PathBuf> {
        let path = key_path(base_dir, network_id, self.account_id());
        self.write_to(&path)?;
        Ok(path)
    }

    /// Read, parse and validate the key pair stored at `path`.
    pub fn load_from_path(path: &Path, account_id: &str) -> Result<Self> {
        let buf = fs::read(path)?;
        let record: KeyRecord = serde_json::from_slice(&buf)?;
        let kp = Self::from_record(&record, account_id)?;
        debug!("Loaded key pair for {} from {:?}", account_id, path);
        Ok(kp)
    }

    /// Load the key pair for `account_id` on `network_id` from the
    /// conventional store location under `base_dir`.
    pub fn load(base_dir: &Path, network_id: &str, account_id: &str) -> Result<Self> {
        Self::load_from_path(&key_path(base_dir, network_id, account_id), account_id)
    }
}

#[cfg(unix)]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(data)
}

#[cfg(not(unix))]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    fs::write(path, data)
}
