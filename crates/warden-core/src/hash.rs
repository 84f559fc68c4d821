//! Content hashing
//!
//! Single place that selects the digest used for fact keys and request
//! fingerprints. Current algorithm: BLAKE3 (32-byte output).

/// Hash output length in bytes
pub const HASH_LEN: usize = 32;

/// Hash a byte slice.
pub fn hash(data: &[u8]) -> [u8; HASH_LEN] {
    *blake3::hash(data).as_bytes()
}

/// Incremental hasher for multi-part input.
pub fn hasher() -> Hasher {
    Hasher(blake3::Hasher::new())
}

/// Incremental hasher wrapper.
#[derive(Debug, Clone)]
pub struct Hasher(blake3::Hasher);

impl Hasher {
    /// Feed more input
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.0.update(data);
        self
    }

    /// Finish and return the digest
    pub fn finalize(&self) -> [u8; HASH_LEN] {
        *self.0.finalize().as_bytes()
    }
}

/// Short hex prefix of a digest, for log lines and keys.
pub fn short_hex(digest: &[u8; HASH_LEN]) -> String {
    hex::encode(&digest[..8])
}
