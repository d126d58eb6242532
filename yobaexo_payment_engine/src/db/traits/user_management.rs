use thiserror::Error;

use crate::db_types::{LicenseStatus, NewUserAccount, UserAccount, UserCredentials};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("An account with email {0} already exists")]
    EmailAlreadyExists(String),
    #[error("User {0} does not exist")]
    UserNotFound(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// Storage for user accounts and their licence flag.
///
/// Email addresses are unique, compared case-insensitively.
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    async fn create_user(&self, user: NewUserAccount) -> Result<UserAccount, AccountApiError>;

    async fn fetch_user(&self, uid: &str) -> Result<Option<UserAccount>, AccountApiError>;

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError>;

    async fn fetch_credentials(&self, email: &str) -> Result<Option<UserCredentials>, AccountApiError>;

    /// Sets the licence flag for the user. Returns `true` if the stored value changed.
    async fn set_license_status(&self, uid: &str, status: LicenseStatus) -> Result<bool, AccountApiError>;
}
