//! Restaurant data exchanged through CSV files, and the state changes the
//! dashboard applies to it.
//!
//! Every operation takes the current collection by value and hands back the
//! updated one, so callers decide where the state lives.

pub mod dashboard;
pub mod inventory;
pub mod menu;
pub mod orders;
pub mod staff;
pub mod tables;

/// One more than the largest id in use, `1` for an empty collection.
pub(crate) fn next_id(ids: impl Iterator<Item = u32>) -> u32 {
    ids.max().map_or(1, |max| max + 1)
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
