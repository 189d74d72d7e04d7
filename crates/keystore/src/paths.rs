use std::env;
use std::path::{Path, PathBuf};

use crate::error::{KeystoreError, Result};

/// Directory under the base directory that holds all stored credentials.
pub const CREDENTIALS_DIR: &str = ".near-credentials";

/// Root of the credentials store under `base_dir`.
pub fn credentials_dir(base_dir: &Path) -> PathBuf {
    base_dir.join(CREDENTIALS_DIR)
}

/// Conventional path of the key file for `account_id` on `network_id`:
/// `<base_dir>/.near-credentials/<network_id>/<account_id>.json`.
///
/// Pure path composition, no file system access.
pub fn key_path(base_dir: &Path, network_id: &str, account_id: &str) -> PathBuf {
    credentials_dir(base_dir)
        .join(network_id)
        .join(format!("{account_id}.json"))
}

/// Default base directory: the user's home directory, read from the
/// environment. The base directory is a parameter everywhere else in this
/// crate so tests never depend on the environment.
pub fn default_base_dir() -> Result<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or(KeystoreError::NoHomeDir)
}
