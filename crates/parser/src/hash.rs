use sha2::{Digest, Sha256};

/// First `len` hex characters of the sha256 digest of `value`
pub(crate) fn hex_prefix(value: &str, len: usize) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let mut hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
    hex.truncate(len);
    hex
}
