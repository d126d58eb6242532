//! # Payment lifecycle reconciliation
//!
//! A payment record is driven by three independent triggers that can arrive in any order:
//!
//! 1. the client's tracking calls (create and update),
//! 2. the client's checkout callback, once its signature and the gateway order have been verified,
//! 3. the gateway's webhooks.
//!
//! [`reconcile`] is a pure function. Given one of these events and the record currently stored for the order (if any),
//! it decides what must be written. The caller applies the resulting [`Reconciliation`] to the store.
//!
//! ```text
//!  initiated ─► created ─► processing ─► authorized ─► captured | completed
//!      │           │            │             │
//!      └───────────┴────────────┴─────────────┴──► failed | cancelled
//! ```
//!
//! Client-supplied statuses are taken as given. Gateway notifications never move a record out of a success terminal
//! (`completed` or `captured`), but their metadata is still merged into `details`.
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    db_types::{
        JsonMap,
        MinorUnits,
        NewPaymentRecord,
        OrderId,
        PaymentRecord,
        PaymentStatus,
        PaymentUpdate,
        DEFAULT_CURRENCY_CODE,
        DEFAULT_PLAN_NAME,
    },
    gateway::GatewayOrder,
    webhooks::{OrderEntity, PaymentEntity, WebhookEvent},
};

/// The client announces that a purchase is under way.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingStarted {
    pub user_id: String,
    pub order_id: OrderId,
    pub amount: MinorUnits,
    pub currency: Option<String>,
    pub plan_id: Option<String>,
    pub plan_name: Option<String>,
    pub status: Option<PaymentStatus>,
    pub error_message: Option<String>,
}

/// The client reports progress on a tracked purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingUpdated {
    pub order_id: Option<OrderId>,
    pub payment_id: Option<String>,
    pub status: PaymentStatus,
    pub error_message: Option<String>,
    pub payment_details: Option<Value>,
    pub license_details: Option<Value>,
}

/// A checkout callback whose signature matched and whose gateway order is paid.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentVerified {
    pub user_id: String,
    pub payment_id: String,
    pub signature: String,
    pub order: GatewayOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    TrackingStarted(TrackingStarted),
    TrackingUpdated(TrackingUpdated),
    PaymentVerified(PaymentVerified),
    Gateway(WebhookEvent),
}

impl From<WebhookEvent> for PaymentEvent {
    fn from(event: WebhookEvent) -> Self {
        PaymentEvent::Gateway(event)
    }
}

/// What has to be written to the store in response to an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// Insert `record` if the order is not tracked yet, otherwise apply `on_conflict` to the existing record.
    Upsert { record: NewPaymentRecord, on_conflict: PaymentUpdate },
    /// Apply `update` to the existing record with id `id`.
    Update { id: i64, update: PaymentUpdate },
    /// The event refers to an order that is not tracked. Nothing is written.
    NotFound { order_id: Option<OrderId> },
    /// The event carries nothing the payment lifecycle acts on.
    Ignored { reason: String },
}

/// Decides how the store must change in response to `event`. `current` is the record currently stored for the
/// order the event refers to, and `now` is the time stamped into any event timestamps.
pub fn reconcile(event: &PaymentEvent, current: Option<&PaymentRecord>, now: DateTime<Utc>) -> Reconciliation {
    match event {
        PaymentEvent::TrackingStarted(e) => tracking_started(e, now),
        PaymentEvent::TrackingUpdated(e) => match current {
            Some(record) => Reconciliation::Update { id: record.id, update: tracking_updated(e, now) },
            None => Reconciliation::NotFound { order_id: e.order_id.clone() },
        },
        PaymentEvent::PaymentVerified(e) => payment_verified(e, now),
        PaymentEvent::Gateway(WebhookEvent::Unhandled(name)) => {
            Reconciliation::Ignored { reason: format!("{name} events are not handled") }
        },
        PaymentEvent::Gateway(e) => match current {
            Some(record) => Reconciliation::Update { id: record.id, update: gateway_update(e, record.status, now) },
            None => Reconciliation::NotFound { order_id: e.order_id().cloned() },
        },
    }
}

fn timestamp(now: DateTime<Utc>) -> Value {
    Value::String(now.to_rfc3339())
}

fn tracking_started(e: &TrackingStarted, now: DateTime<Utc>) -> Reconciliation {
    let currency = e.currency.clone().unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string());
    let plan_name = e.plan_name.clone().unwrap_or_else(|| DEFAULT_PLAN_NAME.to_string());
    let status = e.status.unwrap_or(PaymentStatus::Initiated);
    let error_timestamp = e.error_message.as_ref().map(|_| now);

    let mut record = NewPaymentRecord::new(e.order_id.clone(), e.amount)
        .with_user_id(e.user_id.clone())
        .with_currency(currency.clone())
        .with_status(status);
    record.plan_id = e.plan_id.clone();
    record.plan_name = Some(plan_name.clone());
    record.error_message = e.error_message.clone();
    record.error_timestamp = error_timestamp;

    let on_conflict = PaymentUpdate {
        user_id: Some(e.user_id.clone()),
        amount: Some(e.amount),
        currency: Some(currency),
        status: Some(status),
        plan_id: e.plan_id.clone(),
        plan_name: Some(plan_name),
        error_message: e.error_message.clone(),
        error_timestamp,
        ..Default::default()
    };
    Reconciliation::Upsert { record, on_conflict }
}

fn tracking_updated(e: &TrackingUpdated, now: DateTime<Utc>) -> PaymentUpdate {
    let mut update = PaymentUpdate::default().with_status(e.status);
    update.payment_id = e.payment_id.clone();
    if let Some(msg) = &e.error_message {
        update = update.with_error(msg.clone(), now);
    }
    if let Some(details) = &e.payment_details {
        update = update.with_detail("payment_details", details.clone());
    }
    if let Some(details) = &e.license_details {
        update = update.with_detail("license_details", details.clone());
    }
    update
}

fn payment_verified(e: &PaymentVerified, now: DateTime<Utc>) -> Reconciliation {
    let order = &e.order;
    let mut details = JsonMap::new();
    details.insert("signature".into(), Value::String(e.signature.clone()));
    details.insert("verified_at".into(), timestamp(now));
    let mut license = JsonMap::new();
    license.insert("license_status".into(), Value::String("active".into()));
    license.insert("activated_at".into(), timestamp(now));
    details.insert("license_details".into(), Value::Object(license));

    let mut record = NewPaymentRecord::new(order.id.clone(), order.amount)
        .with_user_id(e.user_id.clone())
        .with_payment_id(e.payment_id.clone())
        .with_currency(order.currency.clone())
        .with_status(PaymentStatus::Completed);
    record.receipt = order.receipt.clone();
    record.details = details.clone();

    let on_conflict = PaymentUpdate {
        payment_id: Some(e.payment_id.clone()),
        user_id: Some(e.user_id.clone()),
        amount: Some(order.amount),
        currency: Some(order.currency.clone()),
        status: Some(PaymentStatus::Completed),
        receipt: order.receipt.clone(),
        details,
        ..Default::default()
    };
    Reconciliation::Upsert { record, on_conflict }
}

fn insert_opt(map: &mut JsonMap, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        map.insert(key.to_string(), Value::String(v.clone()));
    }
}

/// The scalar part of a gateway update. A notification that would demote a success terminal only contributes its
/// metadata, so the status, payment id and amount of a completed record stay as they are.
fn scalar_update(current: PaymentStatus, proposed: PaymentStatus, payment: Option<&PaymentEntity>) -> PaymentUpdate {
    if current.is_success() && !proposed.is_success() {
        return PaymentUpdate::default();
    }
    match payment {
        Some(p) => PaymentUpdate {
            payment_id: Some(p.id.clone()),
            amount: p.amount,
            currency: p.currency.clone(),
            status: Some(proposed),
            ..Default::default()
        },
        None => PaymentUpdate::default().with_status(proposed),
    }
}

fn order_update(o: &OrderEntity, current: PaymentStatus) -> PaymentUpdate {
    let mut update = scalar_update(current, PaymentStatus::Completed, None);
    update.amount = o.amount;
    update.currency = o.currency.clone();
    update
}

fn gateway_update(event: &WebhookEvent, current: PaymentStatus, now: DateTime<Utc>) -> PaymentUpdate {
    match event {
        WebhookEvent::PaymentCaptured(p) => {
            let mut update = scalar_update(current, PaymentStatus::Completed, Some(p));
            insert_opt(&mut update.details, "payment_method", &p.method);
            insert_opt(&mut update.details, "bank", &p.bank);
            insert_opt(&mut update.details, "wallet", &p.wallet);
            insert_opt(&mut update.details, "vpa", &p.vpa);
            update.with_detail("captured_at", timestamp(now))
        },
        WebhookEvent::PaymentFailed(p) => {
            let mut update = scalar_update(current, PaymentStatus::Failed, Some(p));
            let reason = p.failure_reason().map(str::to_string);
            insert_opt(&mut update.details, "failure_reason", &reason);
            if update.status.is_some() {
                let message = reason.unwrap_or_else(|| "Payment failed".to_string());
                update = update.with_error(message, now);
            }
            update.with_detail("failed_at", timestamp(now))
        },
        WebhookEvent::PaymentAuthorized(p) => {
            scalar_update(current, PaymentStatus::Authorized, Some(p)).with_detail("authorized_at", timestamp(now))
        },
        WebhookEvent::OrderPaid(o) => order_update(o, current).with_detail("order_paid_at", timestamp(now)),
        WebhookEvent::Unhandled(_) => PaymentUpdate::default(),
    }
}
