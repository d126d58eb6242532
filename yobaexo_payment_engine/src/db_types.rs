use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, FromRow, Row, Type};
use thiserror::Error;
pub use yobaexo_common::{MinorUnits, DEFAULT_CURRENCY_CODE};

/// An open key-value map, stored as a JSON object.
pub type JsonMap = serde_json::Map<String, Value>;

/// The plan name given to a payment record when the caller does not supply one.
pub const DEFAULT_PLAN_NAME: &str = "Music License";

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        ---------------------------------------------------------
/// The order identifier issued by the payment gateway. This is the primary correlation key for payment records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

//--------------------------------------     PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// The client has started a purchase and is about to hand over to the hosted checkout.
    Initiated,
    /// The gateway order exists.
    Created,
    /// The customer is busy paying.
    Processing,
    /// The gateway has authorized the payment, but has not captured the funds yet.
    Authorized,
    /// Funds have been captured by the gateway.
    Captured,
    /// The payment has been confirmed, either by a verified checkout callback or by the gateway.
    Completed,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    /// `Completed` and `Captured` are the success terminals. Gateway notifications never move a record out of them.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::Captured)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled)
    }

    pub fn is_terminal(&self) -> bool {
        self.is_success() || self.is_failure()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initiated => "initiated",
            Self::Created => "created",
            Self::Processing => "processing",
            Self::Authorized => "authorized",
            Self::Captured => "captured",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initiated" => Ok(Self::Initiated),
            "created" => Ok(Self::Created),
            "processing" => Ok(Self::Processing),
            "authorized" => Ok(Self::Authorized),
            "captured" => Ok(Self::Captured),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------     PaymentRecord     ---------------------------------------------------------
/// One purchase (or donation) attempt, as tracked by the payment lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRecord {
    pub id: i64,
    pub order_id: OrderId,
    pub payment_id: Option<String>,
    pub user_id: Option<String>,
    pub amount: MinorUnits,
    pub currency: String,
    pub status: PaymentStatus,
    pub plan_id: Option<String>,
    pub plan_name: Option<String>,
    pub receipt: Option<String>,
    pub notes: JsonMap,
    /// Gateway and verification metadata, merged key by key on every update.
    pub details: JsonMap,
    pub error_message: Option<String>,
    pub error_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn json_column(row: &SqliteRow, column: &str) -> Result<JsonMap, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    match raw {
        None => Ok(JsonMap::new()),
        Some(s) => serde_json::from_str(&s).map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        }),
    }
}

impl<'r> FromRow<'r, SqliteRow> for PaymentRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            payment_id: row.try_get("payment_id")?,
            user_id: row.try_get("user_id")?,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            status: row.try_get("status")?,
            plan_id: row.try_get("plan_id")?,
            plan_name: row.try_get("plan_name")?,
            receipt: row.try_get("receipt")?,
            notes: json_column(row, "notes")?,
            details: json_column(row, "details")?,
            error_message: row.try_get("error_message")?,
            error_timestamp: row.try_get("error_timestamp")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

//--------------------------------------   NewPaymentRecord    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct NewPaymentRecord {
    pub order_id: OrderId,
    pub payment_id: Option<String>,
    pub user_id: Option<String>,
    pub amount: MinorUnits,
    pub currency: String,
    pub status: PaymentStatus,
    pub plan_id: Option<String>,
    pub plan_name: Option<String>,
    pub receipt: Option<String>,
    pub notes: JsonMap,
    pub details: JsonMap,
    pub error_message: Option<String>,
    pub error_timestamp: Option<DateTime<Utc>>,
}

impl NewPaymentRecord {
    pub fn new(order_id: OrderId, amount: MinorUnits) -> Self {
        Self {
            order_id,
            payment_id: None,
            user_id: None,
            amount,
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            status: PaymentStatus::Initiated,
            plan_id: None,
            plan_name: Some(DEFAULT_PLAN_NAME.to_string()),
            receipt: None,
            notes: JsonMap::new(),
            details: JsonMap::new(),
            error_message: None,
            error_timestamp: None,
        }
    }

    pub fn with_user_id<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_payment_id<S: Into<String>>(mut self, payment_id: S) -> Self {
        self.payment_id = Some(payment_id.into());
        self
    }

    pub fn with_currency<S: Into<String>>(mut self, currency: S) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_receipt<S: Into<String>>(mut self, receipt: S) -> Self {
        self.receipt = Some(receipt.into());
        self
    }
}

//--------------------------------------     PaymentUpdate     ---------------------------------------------------------
/// A partial update to a payment record. `None` fields are left untouched, and the JSON maps are merged key by key
/// into the stored maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentUpdate {
    pub payment_id: Option<String>,
    pub user_id: Option<String>,
    pub amount: Option<MinorUnits>,
    pub currency: Option<String>,
    pub status: Option<PaymentStatus>,
    pub plan_id: Option<String>,
    pub plan_name: Option<String>,
    pub receipt: Option<String>,
    pub notes: JsonMap,
    pub details: JsonMap,
    pub error_message: Option<String>,
    pub error_timestamp: Option<DateTime<Utc>>,
}

impl PaymentUpdate {
    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_payment_id<S: Into<String>>(mut self, payment_id: S) -> Self {
        self.payment_id = Some(payment_id.into());
        self
    }

    pub fn with_error<S: Into<String>>(mut self, message: S, at: DateTime<Utc>) -> Self {
        self.error_message = Some(message.into());
        self.error_timestamp = Some(at);
        self
    }

    pub fn with_detail<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// True when applying this update would only stamp `updated_at`.
    pub fn is_empty(&self) -> bool {
        self.payment_id.is_none() &&
            self.user_id.is_none() &&
            self.amount.is_none() &&
            self.currency.is_none() &&
            self.status.is_none() &&
            self.plan_id.is_none() &&
            self.plan_name.is_none() &&
            self.receipt.is_none() &&
            self.notes.is_empty() &&
            self.details.is_empty() &&
            self.error_message.is_none() &&
            self.error_timestamp.is_none()
    }
}

//--------------------------------------     LicenseStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    #[default]
    Free,
    Active,
}

impl Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Active => write!(f, "active"),
        }
    }
}

//--------------------------------------      UserAccount      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub license_status: LicenseStatus,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUserAccount {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// The stored bcrypt hash for a user. Only ever read during login.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub uid: String,
    pub password_hash: String,
}

//--------------------------------------       Pagination      ---------------------------------------------------------
/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl Pagination {
    pub const MAX_LIMIT: u32 = 100;

    /// Builds a page request from raw query-string values. Missing, non-numeric or zero values fall back to the
    /// defaults, and `limit` is capped at [`Self::MAX_LIMIT`].
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<u32>().ok()).filter(|n| *n > 0);
        let default = Self::default();
        let page = parse(page).unwrap_or(default.page);
        let limit = parse(limit).unwrap_or(default.limit).min(Self::MAX_LIMIT);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        let limit = i64::from(self.limit.max(1));
        (total.max(0) + limit - 1) / limit
    }
}
