//! Approximate membership filtering for known funded addresses.
//!
//! Supports:
//! - Bloom filters in the pybloom-live file format
//! - Exact sets for small target lists

mod bloom;

use std::collections::HashSet;

pub use bloom::{BloomFilter, FilterError};

/// Leading character of the only address class that is checked.
pub const LEGACY_PREFIX: char = '1';

/// A read-only set that may report false positives but never false negatives.
pub trait MembershipFilter: Send + Sync {
    /// Returns `false` only if `item` is definitely not in the set.
    fn maybe_contains(&self, item: &str) -> bool;
}

impl MembershipFilter for HashSet<String> {
    fn maybe_contains(&self, item: &str) -> bool {
        self.contains(item)
    }
}

/// Returns true for addresses of the supported (legacy P2PKH) class.
///
/// Other classes are never consulted against the filter or the ledger.
#[inline]
pub fn is_supported_address(address: &str) -> bool {
    address.starts_with(LEGACY_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_address_class() {
        assert!(is_supported_address("1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm"));
        assert!(!is_supported_address("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy"));
        assert!(!is_supported_address("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"));
        assert!(!is_supported_address(""));
        assert!(!is_supported_address(" 1abc"));
    }

    #[test]
    fn test_exact_set() {
        let set: HashSet<String> = ["1abc".to_string()].into_iter().collect();
        assert!(set.maybe_contains("1abc"));
        assert!(!set.maybe_contains("1abd"));
    }
}
