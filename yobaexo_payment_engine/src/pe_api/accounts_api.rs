//! Payment history for user accounts.

use std::fmt::Debug;

use log::trace;

use crate::{
    db::{PaymentRecordStore, PaymentStoreError},
    db_types::Pagination,
    pe_api::payment_objects::{PageInfo, PaymentHistory},
};

pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: PaymentRecordStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches one page of the user's payments, newest first, together with the paging metadata.
    pub async fn payment_history(&self, user_id: &str, page: Pagination) -> Result<PaymentHistory, PaymentStoreError> {
        let total = self.db.count_payments_for_user(user_id).await?;
        let payments = self.db.fetch_payments_for_user(user_id, page).await?;
        trace!("📜️ Page {} of payment history for {user_id}: {} of {total} payments", page.page, payments.len());
        Ok(PaymentHistory { payments, pagination: PageInfo::new(page, total) })
    }
}
