use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db::traits::AccountApiError,
    db_types::{LicenseStatus, NewUserAccount, UserAccount, UserCredentials},
};

const USER_COLUMNS: &str = "uid, name, email, license_status, email_verified, created_at, updated_at";

pub async fn insert_user(
    user: NewUserAccount,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<UserAccount, AccountApiError> {
    let q = format!(
        r#"INSERT INTO users (uid, name, email, password_hash, created_at, updated_at)
           VALUES ($1, $2, $3, $4, $5, $5)
           RETURNING {USER_COLUMNS};"#
    );
    let email = user.email.clone();
    sqlx::query_as::<_, UserAccount>(&q)
        .bind(user.uid)
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(now)
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(de) if de.is_unique_violation() => {
                debug!("🗃️ Email {email} is already registered");
                AccountApiError::EmailAlreadyExists(email)
            },
            e => e.into(),
        })
}

pub async fn fetch_user(uid: &str, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, AccountApiError> {
    let q = format!("SELECT {USER_COLUMNS} FROM users WHERE uid = $1");
    let user = sqlx::query_as::<_, UserAccount>(&q).bind(uid).fetch_optional(conn).await?;
    Ok(user)
}

/// Emails are compared case-insensitively (the column is declared `COLLATE NOCASE`).
pub async fn fetch_user_by_email(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, AccountApiError> {
    let q = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    let user = sqlx::query_as::<_, UserAccount>(&q).bind(email.trim()).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_credentials(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<UserCredentials>, AccountApiError> {
    let creds = sqlx::query_as::<_, UserCredentials>("SELECT uid, password_hash FROM users WHERE email = $1")
        .bind(email.trim())
        .fetch_optional(conn)
        .await?;
    Ok(creds)
}

/// Returns `true` if the stored status changed, and `false` if it already had the requested value.
pub async fn update_license_status(
    uid: &str,
    status: LicenseStatus,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<bool, AccountApiError> {
    let result = sqlx::query(
        "UPDATE users SET license_status = $1, updated_at = $2 WHERE uid = $3 AND license_status <> $1",
    )
    .bind(status)
    .bind(now)
    .bind(uid)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        debug!("🗃️ Licence status for user {uid} set to {status}");
        return Ok(true);
    }
    match fetch_user(uid, conn).await? {
        Some(_) => Ok(false),
        None => Err(AccountApiError::UserNotFound(uid.to_string())),
    }
}
