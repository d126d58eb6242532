//! User registration and credential checks.
//!
//! Passwords are hashed with bcrypt. Hashing and verification are CPU-bound, so they run on tokio's blocking pool
//! rather than on the async workers.
use std::fmt::Debug;

use log::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::UserManagement,
    db_types::{NewUserAccount, UserAccount},
    helpers::{is_valid_email, non_blank},
    pe_api::errors::AuthApiError,
};

pub const PASSWORD_HASH_COST: u32 = 10;
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct AuthApi<B> {
    db: B,
    hash_cost: u32,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B>
where B: UserManagement
{
    pub fn new(db: B) -> Self {
        Self { db, hash_cost: PASSWORD_HASH_COST }
    }

    /// Overrides the bcrypt cost. Low costs are only suitable for tests.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<UserAccount, AuthApiError> {
        let (Some(name), Some(email), Some(password)) =
            (non_blank(req.name.as_deref()), non_blank(req.email.as_deref()), req.password.as_deref())
        else {
            return Err(AuthApiError::Validation("Name, email and password are required".into()));
        };
        let email = email.to_lowercase();
        if !is_valid_email(&email) {
            return Err(AuthApiError::Validation("Invalid email format".into()));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthApiError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
            )));
        }
        if self.db.fetch_user_by_email(&email).await?.is_some() {
            return Err(AuthApiError::EmailAlreadyExists);
        }
        let password_hash = hash_password(password.to_string(), self.hash_cost).await?;
        let user = NewUserAccount { uid: Uuid::new_v4().to_string(), name: name.to_string(), email, password_hash };
        let account = self.db.create_user(user).await?;
        info!("🔑️ New user {} registered", account.uid);
        Ok(account)
    }

    /// Checks the credentials and returns the matching account. Unknown emails and wrong passwords produce the same
    /// error.
    pub async fn login(&self, req: LoginRequest) -> Result<UserAccount, AuthApiError> {
        let (Some(email), Some(password)) = (non_blank(req.email.as_deref()), req.password.as_deref()) else {
            return Err(AuthApiError::Validation("Email and password are required".into()));
        };
        let Some(creds) = self.db.fetch_credentials(email).await? else {
            debug!("🔑️ Login attempt for unknown email");
            return Err(AuthApiError::InvalidCredentials);
        };
        if !verify_password(password.to_string(), creds.password_hash).await? {
            debug!("🔑️ Wrong password for user {}", creds.uid);
            return Err(AuthApiError::InvalidCredentials);
        }
        let account = self.db.fetch_user(&creds.uid).await?.ok_or(AuthApiError::InvalidCredentials)?;
        debug!("🔑️ User {} logged in", account.uid);
        Ok(account)
    }
}

async fn hash_password(password: String, cost: u32) -> Result<String, AuthApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthApiError::PasswordHashError(e.to_string()))?
        .map_err(|e| AuthApiError::PasswordHashError(e.to_string()))
}

async fn verify_password(password: String, hash: String) -> Result<bool, AuthApiError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthApiError::PasswordHashError(e.to_string()))?
        .map_err(|e| {
            error!("🔑️ Stored password hash could not be parsed: {e}");
            AuthApiError::PasswordHashError(e.to_string())
        })
}
