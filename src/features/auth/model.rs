use serde::{Deserialize, Serialize};

/// Principal extracted from a verified bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Account identifier; the `accountId` claim when present, otherwise `sub`
    pub account_id: String,
    pub sub: String,
    pub roles: Vec<String>,
}

