use std::fmt::Debug;

use chrono::Utc;
use log::*;
use yobaexo_common::Secret;

use crate::{
    db::LicensingDatabase,
    db_types::{LicenseStatus, OrderId, PaymentRecord},
    gateway::{GatewayError, GatewayOrderStatus, PaymentGateway},
    helpers::{non_blank, verify_payment_signature},
    pe_api::{
        errors::PaymentFlowError,
        payment_objects::{
            CheckoutOrder,
            CreateOrderRequest,
            PaymentLookup,
            PaymentOutcome,
            TrackPaymentRequest,
            TrackPaymentUpdateRequest,
            VerifiedPayment,
            VerifyPaymentRequest,
        },
    },
    state_machine::{reconcile, PaymentEvent, PaymentVerified, Reconciliation},
    webhooks::WebhookEvent,
};

/// The public gateway key id (handed to the checkout) and the key secret that signs checkout callbacks.
#[derive(Clone)]
pub struct CheckoutKeys {
    pub key_id: String,
    pub key_secret: Secret<String>,
}

impl CheckoutKeys {
    pub fn new<S: Into<String>>(key_id: S, key_secret: Secret<String>) -> Self {
        Self { key_id: key_id.into(), key_secret }
    }
}

/// `PaymentFlowApi` is the primary API for the payment lifecycle. It combines the payment record store, the state
/// reconciler and the payment gateway to handle every trigger that can move a payment record:
///
/// * [`Self::track_payment`] and [`Self::update_tracked_payment`] for the client's own progress reports,
/// * [`Self::verify_payment`] for checkout callbacks,
/// * [`Self::process_webhook`] for gateway notifications.
pub struct PaymentFlowApi<B, G> {
    db: B,
    gateway: G,
    keys: CheckoutKeys,
}

impl<B, G> Debug for PaymentFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi (key id {})", self.keys.key_id)
    }
}

impl<B, G> PaymentFlowApi<B, G> {
    pub fn new(db: B, gateway: G, keys: CheckoutKeys) -> Self {
        Self { db, gateway, keys }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, G> PaymentFlowApi<B, G>
where
    B: LicensingDatabase,
    G: PaymentGateway,
{
    /// Creates an order on the payment gateway for the given user. Nothing is stored locally; the client tracks the
    /// order afterwards.
    pub async fn create_order(&self, user_id: &str, req: CreateOrderRequest) -> Result<CheckoutOrder, PaymentFlowError> {
        let new_order = req.into_gateway_order(user_id, Utc::now())?;
        let order = self.gateway.create_order(new_order).await?;
        info!("💳️ Gateway order {} created for user {user_id} ({} {})", order.id, order.amount, order.currency);
        Ok(CheckoutOrder {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: self.keys.key_id.clone(),
        })
    }

    /// Starts tracking a purchase. If the order is already tracked, the record is overwritten with the new values.
    pub async fn track_payment(&self, user_id: &str, req: TrackPaymentRequest) -> Result<PaymentRecord, PaymentFlowError> {
        let event = PaymentEvent::TrackingStarted(req.into_event(user_id)?);
        match self.apply(&event, None).await? {
            PaymentOutcome::Recorded(record) => {
                debug!("💳️ Tracking order {} for user {user_id} with status {}", record.order_id, record.status);
                Ok(record)
            },
            outcome => {
                error!("💳️ Tracking start produced {outcome:?}. This is a bug.");
                Err(PaymentFlowError::PaymentNotFound)
            },
        }
    }

    /// Applies a client progress report to a tracked purchase, found by order id or else by payment id.
    pub async fn update_tracked_payment(&self, req: TrackPaymentUpdateRequest) -> Result<PaymentRecord, PaymentFlowError> {
        let update = req.into_event()?;
        let current = self.lookup(update.order_id.as_ref(), update.payment_id.as_deref()).await?;
        let event = PaymentEvent::TrackingUpdated(update);
        match self.apply(&event, current.as_ref()).await? {
            PaymentOutcome::Recorded(record) => {
                debug!("💳️ Order {} is now {}", record.order_id, record.status);
                Ok(record)
            },
            _ => Err(PaymentFlowError::PaymentNotFound),
        }
    }

    pub async fn fetch_payment_status(&self, lookup: PaymentLookup) -> Result<PaymentRecord, PaymentFlowError> {
        let order_id = non_blank(lookup.order_id.as_deref()).map(OrderId::from);
        let payment_id = non_blank(lookup.payment_id.as_deref());
        if order_id.is_none() && payment_id.is_none() {
            return Err(PaymentFlowError::Validation("order_id or payment_id is required".into()));
        }
        self.lookup(order_id.as_ref(), payment_id).await?.ok_or(PaymentFlowError::PaymentNotFound)
    }

    /// Verifies a checkout callback and, if it checks out, marks the purchase as completed and activates the user's
    /// licence.
    ///
    /// The signature is checked first, then the gateway is asked whether the order is paid. Nothing is written unless
    /// both checks pass. Verifying the same payment twice leaves the same completed record behind.
    pub async fn verify_payment(
        &self,
        user_id: &str,
        req: VerifyPaymentRequest,
    ) -> Result<VerifiedPayment, PaymentFlowError> {
        let claim = req.into_claim()?;
        let valid = verify_payment_signature(
            claim.order_id.as_str(),
            &claim.payment_id,
            &claim.signature,
            self.keys.key_secret.reveal(),
        );
        if !valid {
            warn!("💳️ Invalid checkout signature for order {} from user {user_id}", claim.order_id);
            return Err(PaymentFlowError::InvalidSignature);
        }
        let order = match self.gateway.fetch_order(&claim.order_id).await {
            Ok(order) => order,
            Err(GatewayError::OrderNotFound(id)) => return Err(PaymentFlowError::OrderNotPaid(id)),
            Err(e) => return Err(e.into()),
        };
        if order.status != GatewayOrderStatus::Paid {
            info!("💳️ Order {} was presented for verification, but its status is {}", order.id, order.status);
            return Err(PaymentFlowError::OrderNotPaid(claim.order_id));
        }
        let event = PaymentEvent::PaymentVerified(PaymentVerified {
            user_id: user_id.to_string(),
            payment_id: claim.payment_id,
            signature: claim.signature,
            order,
        });
        let record = match self.apply(&event, None).await? {
            PaymentOutcome::Recorded(record) => record,
            outcome => {
                error!("💳️ Payment verification produced {outcome:?}. This is a bug.");
                return Err(PaymentFlowError::PaymentNotFound);
            },
        };
        let license_activated = self.db.set_license_status(user_id, LicenseStatus::Active).await?;
        if license_activated {
            info!("💳️🎵️ Licence activated for user {user_id} after payment for order {}", record.order_id);
        } else {
            debug!("💳️🎵️ Licence for user {user_id} was already active");
        }
        Ok(VerifiedPayment { record, license_activated })
    }

    /// Applies a gateway notification. Notifications for orders that are not tracked, and event types that the
    /// lifecycle does not act on, change nothing.
    pub async fn process_webhook(&self, event: WebhookEvent) -> Result<PaymentOutcome, PaymentFlowError> {
        let current = match event.order_id() {
            Some(order_id) => self.db.find_by_order(order_id).await?,
            None => None,
        };
        let name = event.name().to_string();
        let outcome = self.apply(&PaymentEvent::Gateway(event), current.as_ref()).await?;
        match &outcome {
            PaymentOutcome::Recorded(r) => info!("🪝️ {name}: order {} is now {}", r.order_id, r.status),
            PaymentOutcome::NotTracked(Some(order_id)) => {
                info!("🪝️ {name}: no payment record for order {order_id}. Nothing to do.")
            },
            PaymentOutcome::NotTracked(None) => info!("🪝️ {name}: no order id in the event. Nothing to do."),
            PaymentOutcome::Ignored(reason) => info!("🪝️ Unhandled webhook event. {reason}"),
        }
        Ok(outcome)
    }

    async fn lookup(
        &self,
        order_id: Option<&OrderId>,
        payment_id: Option<&str>,
    ) -> Result<Option<PaymentRecord>, PaymentFlowError> {
        if let Some(order_id) = order_id {
            if let Some(record) = self.db.find_by_order(order_id).await? {
                return Ok(Some(record));
            }
        }
        match payment_id {
            Some(payment_id) => Ok(self.db.find_by_payment(payment_id).await?),
            None => Ok(None),
        }
    }

    async fn apply(
        &self,
        event: &PaymentEvent,
        current: Option<&PaymentRecord>,
    ) -> Result<PaymentOutcome, PaymentFlowError> {
        let outcome = match reconcile(event, current, Utc::now()) {
            Reconciliation::Upsert { record, on_conflict } => {
                PaymentOutcome::Recorded(self.db.upsert(record, on_conflict).await?)
            },
            Reconciliation::Update { id, update } => PaymentOutcome::Recorded(self.db.update(id, update).await?),
            Reconciliation::NotFound { order_id } => PaymentOutcome::NotTracked(order_id),
            Reconciliation::Ignored { reason } => PaymentOutcome::Ignored(reason),
        };
        Ok(outcome)
    }
}
