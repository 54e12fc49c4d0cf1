use uuid::Uuid;

use super::ProviderAccounts;

/// User document as seen by the account handlers
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// One-way hash; never the plain credential
    pub password: String,
    /// Credentials are managed by an external directory (LDAP/AD)
    pub is_ad_user: bool,
    pub jobs_quantity_on_page: i64,
    pub accounts: ProviderAccounts,
}

impl User {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>, jobs_quantity_on_page: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password: password_hash.into(),
            is_ad_user: false,
            jobs_quantity_on_page,
            accounts: ProviderAccounts::default(),
        }
    }
}

/// Partial update applied by [`crate::database::UserStore::update_fields`].
///
/// `password` carries the plain value; stores hash it before writing.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password: Option<String>,
    pub jobs_quantity_on_page: Option<i64>,
    pub accounts: Option<ProviderAccounts>,
}

impl UserPatch {
    pub fn accounts(accounts: ProviderAccounts) -> Self {
        Self {
            accounts: Some(accounts),
            ..Default::default()
        }
    }

    pub fn password(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            ..Default::default()
        }
    }
}
