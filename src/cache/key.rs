//! Key Derivation Module
//!
//! Maps a thumbnail's source identity to a content-addressed cache key.

use sha2::{Digest, Sha256};

// == Derive Key ==
/// Derives the cache key for a (path, size, modified time) triple.
///
/// The fields are hashed with a length prefix on the path, so no pair of
/// distinct triples can share an encoding, and the key stays 64 hex characters
/// however long the path is.
pub fn derive_key(path: &str, size: u32, modified_time: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update((path.len() as u64).to_le_bytes());
    hasher.update(path.as_bytes());
    hasher.update(size.to_le_bytes());
    hasher.update(modified_time.to_le_bytes());
    hex::encode(hasher.finalize())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_deterministic() {
        assert_eq!(derive_key("a", 10, 100), derive_key("a", 10, 100));
    }

    #[test]
    fn test_derive_key_discriminates_fields() {
        let base = derive_key("a", 10, 100);
        assert_ne!(base, derive_key("a", 10, 200));
        assert_ne!(base, derive_key("b", 10, 100));
        assert_ne!(base, derive_key("a", 20, 100));
    }

    #[test]
    fn test_derive_key_no_field_bleed() {
        // "a" + 1 must not collide with "a1" + 0, in either direction
        assert_ne!(derive_key("a", 1, 0), derive_key("a1", 0, 0));
        assert_ne!(derive_key("a:1", 2, 3), derive_key("a", 1, 23));
    }

    #[test]
    fn test_derive_key_fixed_length() {
        let long_path = "/very/deep/".repeat(200);
        assert_eq!(derive_key(&long_path, 256, 1_700_000_000_000).len(), 64);
        assert_eq!(derive_key("", 0, 0).len(), 64);
    }
}
