use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db::traits::PaymentStoreError,
    db_types::{JsonMap, NewPaymentRecord, OrderId, Pagination, PaymentRecord, PaymentUpdate},
};

fn to_json(map: &JsonMap) -> Result<String, PaymentStoreError> {
    serde_json::to_string(map).map_err(|e| PaymentStoreError::DatabaseError(format!("Could not serialize map: {e}")))
}

pub async fn fetch_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentRecord>, PaymentStoreError> {
    let record = sqlx::query_as::<_, PaymentRecord>("SELECT * FROM payments WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(record)
}

/// Returns the most recent record carrying the given gateway payment id.
pub async fn fetch_by_payment_id(
    payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentRecord>, PaymentStoreError> {
    let record = sqlx::query_as::<_, PaymentRecord>(
        "SELECT * FROM payments WHERE payment_id = $1 ORDER BY updated_at DESC, id DESC LIMIT 1",
    )
    .bind(payment_id)
    .fetch_optional(conn)
    .await?;
    Ok(record)
}

/// Inserts the record unless one already exists for the same `order_id`. Returns `None` when the order is already
/// tracked; the existing record is left untouched in that case.
pub async fn insert_if_absent(
    record: NewPaymentRecord,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentRecord>, PaymentStoreError> {
    let notes = to_json(&record.notes)?;
    let details = to_json(&record.details)?;
    let inserted = sqlx::query_as::<_, PaymentRecord>(
        r#"
            INSERT INTO payments (
                order_id,
                payment_id,
                user_id,
                amount,
                currency,
                status,
                plan_id,
                plan_name,
                receipt,
                notes,
                details,
                error_message,
                error_timestamp,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            ON CONFLICT (order_id) DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(record.order_id.as_str())
    .bind(record.payment_id)
    .bind(record.user_id)
    .bind(record.amount)
    .bind(record.currency)
    .bind(record.status)
    .bind(record.plan_id)
    .bind(record.plan_name)
    .bind(record.receipt)
    .bind(notes)
    .bind(details)
    .bind(record.error_message)
    .bind(record.error_timestamp)
    .bind(now)
    .fetch_optional(conn)
    .await?;
    if let Some(r) = &inserted {
        trace!("🗃️ Payment record #{} created for order {}", r.id, r.order_id);
    }
    Ok(inserted)
}

pub async fn fetch_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<PaymentRecord>, PaymentStoreError> {
    let record =
        sqlx::query_as::<_, PaymentRecord>("SELECT * FROM payments WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(record)
}

/// Applies a partial update. Unset scalar fields keep their stored value. The top-level keys of the update's JSON maps
/// replace the stored keys of the same name as-is, nulls and nested objects included; other stored keys are kept.
/// Returns `None` if no record has the given `id`.
///
/// The stored maps are read before they are written, so run this inside a transaction.
pub async fn update_record(
    id: i64,
    update: PaymentUpdate,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentRecord>, PaymentStoreError> {
    let Some(current) = fetch_by_id(id, &mut *conn).await? else {
        return Ok(None);
    };
    let mut notes = current.notes;
    notes.extend(update.notes);
    let mut details = current.details;
    details.extend(update.details);
    let notes = to_json(&notes)?;
    let details = to_json(&details)?;
    let updated = sqlx::query_as::<_, PaymentRecord>(
        r#"
            UPDATE payments SET
                payment_id = COALESCE($1, payment_id),
                user_id = COALESCE($2, user_id),
                amount = COALESCE($3, amount),
                currency = COALESCE($4, currency),
                status = COALESCE($5, status),
                plan_id = COALESCE($6, plan_id),
                plan_name = COALESCE($7, plan_name),
                receipt = COALESCE($8, receipt),
                notes = $9,
                details = $10,
                error_message = COALESCE($11, error_message),
                error_timestamp = COALESCE($12, error_timestamp),
                updated_at = $13
            WHERE id = $14
            RETURNING *;
        "#,
    )
    .bind(update.payment_id)
    .bind(update.user_id)
    .bind(update.amount)
    .bind(update.currency)
    .bind(update.status)
    .bind(update.plan_id)
    .bind(update.plan_name)
    .bind(update.receipt)
    .bind(notes)
    .bind(details)
    .bind(update.error_message)
    .bind(update.error_timestamp)
    .bind(now)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    if let Some(r) = &updated {
        trace!("🗃️ Payment record #{} for order {} updated. Status is {}", r.id, r.order_id, r.status);
    }
    Ok(updated)
}

pub async fn fetch_for_user(
    user_id: &str,
    page: Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentRecord>, PaymentStoreError> {
    let records = sqlx::query_as::<_, PaymentRecord>(
        r#"
            SELECT * FROM payments
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3;
        "#,
    )
    .bind(user_id)
    .bind(i64::from(page.limit))
    .bind(page.offset())
    .fetch_all(conn)
    .await?;
    Ok(records)
}

pub async fn count_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<i64, PaymentStoreError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE user_id = $1").bind(user_id).fetch_one(conn).await?;
    Ok(count)
}
