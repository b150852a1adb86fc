/// Upper bound for bodies buffered by the schema validation middleware
pub const MAX_SCHEMA_BODY_SIZE: usize = 64 * 1024;

/// Message returned for malformed or non-positive path ids
pub const INVALID_ID_MESSAGE: &str = "Invalid ID supplied";
