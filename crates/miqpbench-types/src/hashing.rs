use sha2::{Digest, Sha256};

/// Hash reference (hex-encoded SHA256)
pub type HashRef = String;

/// Compute SHA256 hash of data
pub fn compute_hash(data: &[u8]) -> HashRef {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Fold an ordered sequence of hashes into a single digest.
///
/// Order matters: the same hashes in a different order give a different digest.
pub fn fold_hashes<'a, I>(hashes: I) -> HashRef
where
    I: IntoIterator<Item = &'a HashRef>,
{
    let mut hasher = Sha256::new();
    for hash in hashes {
        hasher.update(hash.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash() {
        let hash = compute_hash(b"hello world");
        assert_eq!(hash.len(), 64); // SHA256 hex is 64 chars
    }

    #[test]
    fn test_fold_is_order_sensitive() {
        let a = compute_hash(b"a");
        let b = compute_hash(b"b");

        assert_eq!(fold_hashes([&a, &b]), fold_hashes([&a, &b]));
        assert_ne!(fold_hashes([&a, &b]), fold_hashes([&b, &a]));
    }
}
