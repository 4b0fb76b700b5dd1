use sha2::{Digest, Sha256};

/// Generate an opaque single-use token (256 bits, hex-encoded).
pub fn generate() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Storage hash for an opaque token. Only the hash ever reaches the database.
pub fn sha256_hex(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
