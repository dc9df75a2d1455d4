use ahash::RandomState as AHashRandomState;
use std::hash::BuildHasher;

/// Deterministic 64-bit hash of a packed key.
/// Seeds are fixed so identical inputs land in identical buckets on every run.
#[inline]
pub fn hash_key_bytes(key: &[u8]) -> u64 {
    AHashRandomState::with_seeds(0, 0, 0, 0).hash_one(key)
}
