// file: src/models/identity.rs
// description: caller identity as supplied by the identity provider
// reference: internal data structures

use serde::{Deserialize, Serialize};

/// Stable identity of the caller for the current session.
///
/// The identity provider is external; by the time a tool is invoked the user id is an
/// opaque, already-authenticated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: String,
    pub display_name: String,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }

    /// Key of this user's record in the key-value store.
    pub fn storage_key(&self) -> String {
        format!("user:{}", self.user_id)
    }
}
