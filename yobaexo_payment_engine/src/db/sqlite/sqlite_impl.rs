//! `SqliteDatabase` is the concrete storage backend for the payment engine.
//!
//! It implements [`PaymentRecordStore`] and [`UserManagement`], and by extension [`LicensingDatabase`].
//!
//! [`LicensingDatabase`]: crate::db::traits::LicensingDatabase
use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::SqlitePool;

use super::{db_url, new_pool, payments, users, SqliteDatabaseError};
use crate::{
    db::traits::{AccountApiError, PaymentRecordStore, PaymentStoreError, UserManagement},
    db_types::{
        LicenseStatus,
        NewPaymentRecord,
        NewUserAccount,
        OrderId,
        Pagination,
        PaymentRecord,
        PaymentUpdate,
        UserAccount,
        UserCredentials,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `YOBA_DATABASE_URL`, or the default if it is not set.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn migrate(&self) -> Result<(), SqliteDatabaseError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl PaymentRecordStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn find_by_order(&self, order_id: &OrderId) -> Result<Option<PaymentRecord>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_by_order_id(order_id, &mut conn).await
    }

    async fn find_by_payment(&self, payment_id: &str) -> Result<Option<PaymentRecord>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_by_payment_id(payment_id, &mut conn).await
    }

    async fn create(&self, record: NewPaymentRecord) -> Result<PaymentRecord, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order_id = record.order_id.clone();
        payments::insert_if_absent(record, Utc::now(), &mut conn)
            .await?
            .ok_or(PaymentStoreError::DuplicateOrder(order_id))
    }

    async fn update(&self, id: i64, update: PaymentUpdate) -> Result<PaymentRecord, PaymentStoreError> {
        let mut tx = self.pool.begin().await?;
        let updated =
            payments::update_record(id, update, Utc::now(), &mut tx).await?.ok_or(PaymentStoreError::RecordNotFound(id))?;
        tx.commit().await?;
        Ok(updated)
    }

    /// The insert and the fallback update run in one transaction. The `ON CONFLICT DO NOTHING` insert guarantees that
    /// concurrent callers can never create two records for the same order.
    async fn upsert(
        &self,
        record: NewPaymentRecord,
        on_conflict: PaymentUpdate,
    ) -> Result<PaymentRecord, PaymentStoreError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let order_id = record.order_id.clone();
        let result = match payments::insert_if_absent(record, now, &mut tx).await? {
            Some(inserted) => inserted,
            None => {
                let existing = payments::fetch_by_order_id(&order_id, &mut tx).await?.ok_or_else(|| {
                    error!("🗃️ Order {order_id} conflicted on insert, but cannot be found. This is a bug.");
                    PaymentStoreError::DatabaseError(format!("Record for order {order_id} vanished during upsert"))
                })?;
                debug!("🗃️ Order {order_id} is already tracked as #{}. Merging the changes.", existing.id);
                payments::update_record(existing.id, on_conflict, now, &mut tx)
                    .await?
                    .ok_or(PaymentStoreError::RecordNotFound(existing.id))?
            },
        };
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_payments_for_user(
        &self,
        user_id: &str,
        page: Pagination,
    ) -> Result<Vec<PaymentRecord>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_for_user(user_id, page, &mut conn).await
    }

    async fn count_payments_for_user(&self, user_id: &str) -> Result<i64, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        payments::count_for_user(user_id, &mut conn).await
    }
}

impl UserManagement for SqliteDatabase {
    async fn create_user(&self, user: NewUserAccount) -> Result<UserAccount, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_user(user, Utc::now(), &mut conn).await
    }

    async fn fetch_user(&self, uid: &str) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user(uid, &mut conn).await
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_email(email, &mut conn).await
    }

    async fn fetch_credentials(&self, email: &str) -> Result<Option<UserCredentials>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_credentials(email, &mut conn).await
    }

    async fn set_license_status(&self, uid: &str, status: LicenseStatus) -> Result<bool, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::update_license_status(uid, status, Utc::now(), &mut conn).await
    }
}
