//! Authenticated account returned by the user endpoint.

use serde::Deserialize;

/// An email address registered on the account.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Email {
    pub email: String,
    pub is_primary: bool,
    pub is_verified: bool,
}

/// The account that owns the credential used for a request.
///
/// `default_group_guid` selects the group whose links are aggregated.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct User {
    pub default_group_guid: String,
    pub login: String,
    pub name: String,
    pub is_active: bool,
    pub is_sso_user: bool,
    pub is_2fa_enabled: bool,
    pub created: String,
    pub modified: String,
    pub emails: Vec<Email>,
}

impl User {
    /// Creates a user that belongs to the given default group.
    pub fn in_group(group_guid: impl Into<String>) -> Self {
        Self {
            default_group_guid: group_guid.into(),
            is_active: true,
            ..Self::default()
        }
    }
}
