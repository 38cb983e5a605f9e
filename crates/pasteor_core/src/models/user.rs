//! Authenticated user profile shape.

use serde::{Deserialize, Serialize};

/// Profile returned by the auth endpoint for a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub provider: String,
}

impl UserProfile {
    /// Display name with the email fallback used in greetings.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}
