//! Application-wide constants

/// Parent id used by root-level menu nodes.
pub const ROOT_PARENT_ID: i64 = 0;

pub const DEFAULT_PARTITION: &str = "admin";
pub const MAX_PARTITION_LENGTH: usize = 32;

/// Header carrying the acting operator's id on mutating requests.
pub const OPERATOR_HEADER: &str = "x-operator-id";
