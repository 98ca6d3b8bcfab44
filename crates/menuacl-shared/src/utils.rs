//! Utility functions

use crate::constants::MAX_PARTITION_LENGTH;

/// Sorts ids ascending and drops duplicates.
pub fn sorted_unique<I>(ids: I) -> Vec<i64>
where
    I: IntoIterator<Item = i64>,
{
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Partition keys are short lowercase slugs such as `admin` or `member`.
pub fn is_valid_partition(partition: &str) -> bool {
    !partition.is_empty()
        && partition.len() <= MAX_PARTITION_LENGTH
        && partition
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_unique() {
        assert_eq!(sorted_unique(vec![3, 1, 3, 2, 1]), vec![1, 2, 3]);
        assert!(sorted_unique(Vec::new()).is_empty());
    }

    #[test]
    fn test_partition_rules() {
        assert!(is_valid_partition("admin"));
        assert!(is_valid_partition("member_v2"));
        assert!(!is_valid_partition(""));
        assert!(!is_valid_partition("Admin"));
        assert!(!is_valid_partition("a b"));
    }
}
