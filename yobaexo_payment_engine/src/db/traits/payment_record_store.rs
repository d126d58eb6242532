use thiserror::Error;

use crate::db_types::{NewPaymentRecord, OrderId, Pagination, PaymentRecord, PaymentUpdate};

#[derive(Debug, Clone, Error)]
pub enum PaymentStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A payment record for order {0} already exists")]
    DuplicateOrder(OrderId),
    #[error("Payment record #{0} does not exist")]
    RecordNotFound(i64),
}

impl From<sqlx::Error> for PaymentStoreError {
    fn from(e: sqlx::Error) -> Self {
        PaymentStoreError::DatabaseError(e.to_string())
    }
}

/// Persistence for payment lifecycle records.
///
/// Implementations must guarantee that at most one record exists for any given `order_id`, even under concurrent
/// callers. Records are never deleted.
#[allow(async_fn_in_trait)]
pub trait PaymentRecordStore {
    /// The URL of the database
    fn url(&self) -> &str;

    async fn find_by_order(&self, order_id: &OrderId) -> Result<Option<PaymentRecord>, PaymentStoreError>;

    async fn find_by_payment(&self, payment_id: &str) -> Result<Option<PaymentRecord>, PaymentStoreError>;

    /// Inserts a brand-new record. Fails with [`PaymentStoreError::DuplicateOrder`] if the order is already tracked.
    async fn create(&self, record: NewPaymentRecord) -> Result<PaymentRecord, PaymentStoreError>;

    /// Applies `update` to the record with the given `id`. Only the fields that are set are written; `notes` and
    /// `details` are merged key by key. `updated_at` is always stamped and `created_at` is never touched.
    async fn update(&self, id: i64, update: PaymentUpdate) -> Result<PaymentRecord, PaymentStoreError>;

    /// Atomically inserts `record` if no record exists for its `order_id`, otherwise applies `on_conflict` to the
    /// existing record.
    async fn upsert(&self, record: NewPaymentRecord, on_conflict: PaymentUpdate)
        -> Result<PaymentRecord, PaymentStoreError>;

    /// The records owned by `user_id`, most recent first.
    async fn fetch_payments_for_user(
        &self,
        user_id: &str,
        page: Pagination,
    ) -> Result<Vec<PaymentRecord>, PaymentStoreError>;

    async fn count_payments_for_user(&self, user_id: &str) -> Result<i64, PaymentStoreError>;
}
