//! NEAR Credentials Keystore
//!
//! Unencrypted file system key store for NEAR account keys.
//!
//! ## Features
//!
//! - Ed25519 key pair generation and loading
//! - `.near-credentials` directory layout (`<base>/<network>/<account>.json`)
//! - base58 key encoding with `ed25519:` algorithm tags
//! - Legacy `private_key` / `secret_key` field handling on load
//! - Owner-only file permissions for stored keys

mod error;
mod keypair;
mod paths;
mod store;

pub use error::{KeystoreError, Result};
pub use keypair::{Ed25519KeyPair, KeyRecord, ED25519_PREFIX};
pub use paths::{credentials_dir, default_base_dir, key_path, CREDENTIALS_DIR};
