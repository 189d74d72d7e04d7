use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeystoreError {
    #[error("Failed to read entropy from the OS random source: {0}")]
    RandomSource(rand::Error),

    #[error("Parsed account_id '{found}' does not match account ID '{expected}'")]
    AccountMismatch { expected: String, found: String },

    #[error("Parsed key '{0}' is not an ed25519 key")]
    UnsupportedAlgorithm(String),

    #[error("private_key and secret_key are defined at the same time")]
    AmbiguousPrivateKey,

    #[error("public_key does not match the key derived from private_key")]
    KeyMismatch,

    #[error("Invalid base58 key payload: {0}")]
    InvalidBase58(#[from] bs58::decode::Error),

    #[error("Invalid key length: expected {expected} bytes, got {found}")]
    InvalidKeyLength { expected: usize, found: usize },

    #[error("Could not determine the user home directory")]
    NoHomeDir,

    #[error("Failed to parse key file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KeystoreError>;
