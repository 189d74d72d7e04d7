use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{KeystoreError, Result};

/// Algorithm tag carried by every encoded key string.
pub const ED25519_PREFIX: &str = "ed25519:";

/// On-disk JSON record for a stored key pair.
///
/// `private_key` and `secret_key` are two legacy names for the same logical
/// slot. Exactly one of them is populated in a valid record; empty slots are
/// omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub account_id: String,
    pub public_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub private_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret_key: String,
}

/// An Ed25519 key pair bound to a NEAR account ID.
///
/// Holds both the tagged base58 string forms and the raw dalek keys. The raw
/// forms are always derived from the same bytes as the string forms, so the
/// two never diverge.
///
/// Construction is split into two paths on purpose:
/// - trusted ([`generate`](Self::generate),
///   [`from_keypair_bytes`](Self::from_keypair_bytes)) — the caller supplies
///   or produces the key material, no cross-checks are run;
/// - untrusted ([`from_record`](Self::from_record)) — parsed from external
///   bytes, every consistency check in the format contract is enforced.
#[derive(Debug)]
pub struct Ed25519KeyPair {
    account_id: String,
    public_key: String,
    private_key: String,
    verifying_key: VerifyingKey,
    signing_key: SigningKey,
}

impl Clone for Ed25519KeyPair {
    fn clone(&self) -> Self {
        Self {
            account_id: self.account_id.clone(),
            public_key: self.public_key.clone(),
            private_key: self.private_key.clone(),
            verifying_key: self.verifying_key,
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl Ed25519KeyPair {
    /// Generate a new random key pair for `account_id`.
    ///
    /// An entropy failure in the OS random source is fatal and propagated as
    /// [`KeystoreError::RandomSource`]; there is no retry.
    pub fn generate(account_id: impl Into<String>) -> Result<Self> {
        let mut seed = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(KeystoreError::RandomSource)?;
        let signing_key = SigningKey::from_bytes(&seed);
        Ok(Self::from_signing_key(signing_key, account_id.into()))
    }

    /// Wrap raw private key material (seed followed by public key, the
    /// standard 64-byte Ed25519 encoding) for `account_id`.
    ///
    /// Trusted construction path: the public key is re-derived from the seed
    /// half and the trailing 32 bytes are not checked against it. Validation
    /// happens only when a key pair is decoded from a persisted record.
    pub fn from_keypair_bytes(bytes: &[u8; 64], account_id: impl Into<String>) -> Self {
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes[..32]);
        let signing_key = SigningKey::from_bytes(&seed);
        Self::from_signing_key(signing_key, account_id.into())
    }

    fn from_signing_key(signing_key: SigningKey, account_id: String) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            account_id,
            public_key: encode_key(&verifying_key.to_bytes()),
            private_key: encode_key(&signing_key.to_keypair_bytes()),
            verifying_key,
            signing_key,
        }
    }

    /// Encode into the on-disk record form.
    ///
    /// Deterministic; always fills the `private_key` slot and leaves the
    /// legacy `secret_key` slot empty.
    pub fn to_record(&self) -> KeyRecord {
        KeyRecord {
            account_id: self.account_id.clone(),
            public_key: self.public_key.clone(),
            private_key: self.private_key.clone(),
            secret_key: String::new(),
        }
    }

    /// Decode and validate a persisted record.
    ///
    /// Checks run in order and the first failure wins:
    /// 1. the record's `account_id` must equal the expected one exactly;
    /// 2. `public_key` must carry the `ed25519:` tag;
    /// 3. exactly one of `private_key` / `secret_key` may be populated, and
    ///    the populated one must carry the `ed25519:` tag;
    /// 4. both base58 payloads must decode to the fixed key sizes;
    /// 5. the public key derived from the private key must equal the decoded
    ///    `public_key` bytes.
    pub fn from_record(record: &KeyRecord, account_id: &str) -> Result<Self> {
        if record.account_id != account_id {
            return Err(KeystoreError::AccountMismatch {
                expected: account_id.to_string(),
                found: record.account_id.clone(),
            });
        }

        let public_payload = strip_prefix(&record.public_key)?;

        // One logical private key source with two accepted serialized names.
        // Never silently prefer one when both are present.
        let encoded_private = match (record.private_key.is_empty(), record.secret_key.is_empty()) {
            (false, false) => return Err(KeystoreError::AmbiguousPrivateKey),
            (false, true) => &record.private_key,
            (true, _) => &record.secret_key,
        };
        let private_payload = strip_prefix(encoded_private)?;

        let public_raw: [u8; 32] = decode_payload(public_payload)?;
        let private_raw: [u8; 64] = decode_payload(private_payload)?;

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&private_raw[..32]);
        let signing_key = SigningKey::from_bytes(&seed);
        let verifying_key = signing_key.verifying_key();
        if verifying_key.to_bytes() != public_raw {
            return Err(KeystoreError::KeyMismatch);
        }

        // Re-encode from the raw bytes so a record loaded through the legacy
        // secret_key slot carries the same canonical string forms.
        Ok(Self::from_signing_key(signing_key, record.account_id.clone()))
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Tagged base58 public key string.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Tagged base58 private key string.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Raw 32-byte public key.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Raw 64-byte private key material (seed followed by public key).
    pub fn private_key_bytes(&self) -> [u8; 64] {
        self.signing_key.to_keypair_bytes()
    }
}

fn encode_key(raw: &[u8]) -> String {
    format!("{}{}", ED25519_PREFIX, bs58::encode(raw).into_string())
}

fn strip_prefix(encoded: &str) -> Result<&str> {
    encoded
        .strip_prefix(ED25519_PREFIX)
        .ok_or_else(|| KeystoreError::UnsupportedAlgorithm(encoded.to_string()))
}

fn decode_payload<const N: usize>(payload: &str) -> Result<[u8; N]> {
    let raw = bs58::decode(payload).into_vec()?;
    let found = raw.len();
    raw.try_into()
        .map_err(|_| KeystoreError::InvalidKeyLength { expected: N, found })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_for(kp: &Ed25519KeyPair) -> KeyRecord {
        kp.to_record()
    }

    #[test]
    fn test_generate_produces_distinct_keys() {
        let a = Ed25519KeyPair::generate("alice.near").unwrap();
        let b = Ed25519KeyPair::generate("alice.near").unwrap();
        assert_ne!(a.public_key_bytes(), b.public_key_bytes());
    }

    #[test]
    fn test_record_roundtrip() {
        let kp = Ed25519KeyPair::generate("alice.near").unwrap();
        let restored = Ed25519KeyPair::from_record(&record_for(&kp), "alice.near").unwrap();
        assert_eq!(restored.account_id(), kp.account_id());
        assert_eq!(restored.public_key_bytes(), kp.public_key_bytes());
        assert_eq!(restored.private_key_bytes(), kp.private_key_bytes());
        assert_eq!(restored.public_key(), kp.public_key());
        assert_eq!(restored.private_key(), kp.private_key());
    }

    #[test]
    fn test_from_keypair_bytes_derives_public_key() {
        let kp = Ed25519KeyPair::generate("alice.near").unwrap();
        let restored = Ed25519KeyPair::from_keypair_bytes(&kp.private_key_bytes(), "alice.near");
        assert_eq!(restored.public_key_bytes(), kp.public_key_bytes());
        assert_eq!(restored.public_key(), kp.public_key());
    }

    #[test]
    fn test_decode_rejects_account_mismatch_first() {
        let kp = Ed25519KeyPair::generate("alice.near").unwrap();
        let mut record = record_for(&kp);
        record.account_id = "bob.near".to_string();
        // The public key is deliberately corrupted too; the account check
        // must fire before any key validation.
        record.public_key = "garbage".to_string();
        let err = Ed25519KeyPair::from_record(&record, "alice.near").unwrap_err();
        assert!(matches!(
            err,
            KeystoreError::AccountMismatch { ref expected, ref found }
                if expected.as_str() == "alice.near" && found.as_str() == "bob.near"
        ));
    }

    #[test]
    fn test_decode_rejects_untagged_public_key() {
        let kp = Ed25519KeyPair::generate("alice.near").unwrap();
        let mut record = record_for(&kp);
        record.public_key = record.public_key.trim_start_matches(ED25519_PREFIX).to_string();
        let err = Ed25519KeyPair::from_record(&record, "alice.near").unwrap_err();
        assert!(matches!(err, KeystoreError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_decode_rejects_untagged_private_key() {
        let kp = Ed25519KeyPair::generate("alice.near").unwrap();
        let mut record = record_for(&kp);
        record.private_key = record.private_key.trim_start_matches(ED25519_PREFIX).to_string();
        let err = Ed25519KeyPair::from_record(&record, "alice.near").unwrap_err();
        assert!(matches!(err, KeystoreError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_decode_rejects_both_slots_even_when_equal() {
        let kp = Ed25519KeyPair::generate("alice.near").unwrap();
        let mut record = record_for(&kp);
        record.secret_key = record.private_key.clone();
        let err = Ed25519KeyPair::from_record(&record, "alice.near").unwrap_err();
        assert!(matches!(err, KeystoreError::AmbiguousPrivateKey));
    }

    #[test]
    fn test_decode_rejects_empty_slots() {
        let kp = Ed25519KeyPair::generate("alice.near").unwrap();
        let mut record = record_for(&kp);
        record.private_key = String::new();
        let err = Ed25519KeyPair::from_record(&record, "alice.near").unwrap_err();
        assert!(matches!(err, KeystoreError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_decode_accepts_legacy_secret_key_slot() {
        let kp = Ed25519KeyPair::generate("alice.near").unwrap();
        let mut record = record_for(&kp);
        record.secret_key = std::mem::take(&mut record.private_key);
        let restored = Ed25519KeyPair::from_record(&record, "alice.near").unwrap();
        assert_eq!(restored.public_key_bytes(), kp.public_key_bytes());
        assert_eq!(restored.private_key_bytes(), kp.private_key_bytes());
        // Loaded value is canonical: the private_key slot is populated again.
        assert_eq!(restored.private_key(), kp.private_key());
    }

    #[test]
    fn test_decode_rejects_mismatched_keys() {
        let kp = Ed25519KeyPair::generate("alice.near").unwrap();
        let other = Ed25519KeyPair::generate("alice.near").unwrap();
        let mut record = record_for(&kp);
        record.public_key = other.public_key().to_string();
        let err = Ed25519KeyPair::from_record(&record, "alice.near").unwrap_err();
        assert!(matches!(err, KeystoreError::KeyMismatch));
    }

    #[test]
    fn test_decode_rejects_bad_base58_payload() {
        let kp = Ed25519KeyPair::generate("alice.near").unwrap();
        let mut record = record_for(&kp);
        record.public_key = format!("{}0OIl", ED25519_PREFIX);
        let err = Ed25519KeyPair::from_record(&record, "alice.near").unwrap_err();
        assert!(matches!(err, KeystoreError::InvalidBase58(_)));
    }

    #[test]
    fn test_decode_rejects_truncated_key_payload() {
        let kp = Ed25519KeyPair::generate("alice.near").unwrap();
        let mut record = record_for(&kp);
        record.public_key = format!(
            "{}{}",
            ED25519_PREFIX,
            bs58::encode(&kp.public_key_bytes()[..16]).into_string()
        );
        let err = Ed25519KeyPair::from_record(&record, "alice.near").unwrap_err();
        assert!(matches!(
            err,
            KeystoreError::InvalidKeyLength { expected: 32, found: 16 }
        ));
    }

    #[test]
    fn test_serialized_record_omits_empty_slots() {
        let kp = Ed25519KeyPair::generate("alice.near").unwrap();
        let json = serde_json::to_value(record_for(&kp)).unwrap();
        let object = json.as_object().unwrap();
        assert!(object.contains_key("private_key"));
        assert!(!object.contains_key("secret_key"));
    }

    #[test]
    fn test_encoded_strings_carry_algorithm_tag() {
        let kp = Ed25519KeyPair::generate("alice.near").unwrap();
        assert!(kp.public_key().starts_with(ED25519_PREFIX));
        assert!(kp.private_key().starts_with(ED25519_PREFIX));
    }
}
