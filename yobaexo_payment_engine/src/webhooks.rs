//! # Gateway webhooks
//!
//! The gateway posts JSON envelopes of the form `{"event": "<tag>", "payload": {...}}`. This module turns those
//! envelopes into typed [`WebhookEvent`]s. Routing an event to a state change is the job of the
//! [`state_machine`](crate::state_machine).
//!
//! Entities inside the payload may arrive wrapped (`{"payment": {"entity": {...}}}`, which is what the gateway sends)
//! or bare (`{"payment": {...}}`). Both shapes are accepted.
//!
//! Tags this module does not know about become [`WebhookEvent::Unhandled`]. They are acknowledged and otherwise
//! ignored.
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;

use crate::db_types::{MinorUnits, OrderId};

pub const PAYMENT_CAPTURED: &str = "payment.captured";
pub const PAYMENT_FAILED: &str = "payment.failed";
pub const PAYMENT_AUTHORIZED: &str = "payment.authorized";
pub const ORDER_PAID: &str = "order.paid";

#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    #[error("Webhook body is not a valid event envelope: {0}")]
    InvalidEnvelope(String),
    #[error("Payload for {event} is malformed: {reason}")]
    InvalidPayload { event: String, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Entity<T> {
    Wrapped { entity: T },
    Bare(T),
}

impl<T> Entity<T> {
    fn into_inner(self) -> T {
        match self {
            Entity::Wrapped { entity } => entity,
            Entity::Bare(t) => t,
        }
    }
}

/// The parts of a gateway payment entity that the payment lifecycle cares about.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    pub order_id: OrderId,
    pub amount: Option<MinorUnits>,
    pub currency: Option<String>,
    pub method: Option<String>,
    pub bank: Option<String>,
    pub wallet: Option<String>,
    pub vpa: Option<String>,
    reason: Option<String>,
    error_description: Option<String>,
}

impl PaymentEntity {
    pub fn new<S: Into<String>>(id: S, order_id: OrderId) -> Self {
        Self {
            id: id.into(),
            order_id,
            amount: None,
            currency: None,
            method: None,
            bank: None,
            wallet: None,
            vpa: None,
            reason: None,
            error_description: None,
        }
    }

    pub fn with_amount<S: Into<String>>(mut self, amount: MinorUnits, currency: S) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency.into());
        self
    }

    pub fn with_method<S: Into<String>>(mut self, method: S) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_failure_reason<S: Into<String>>(mut self, reason: S) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// The failure reason, preferring the short `reason` code over the human-readable description.
    pub fn failure_reason(&self) -> Option<&str> {
        self.reason.as_deref().or(self.error_description.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderEntity {
    pub id: OrderId,
    pub amount: Option<MinorUnits>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PaymentPayload {
    payment: Entity<PaymentEntity>,
}

#[derive(Debug, Clone, Deserialize)]
struct OrderPayload {
    order: Entity<OrderEntity>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    PaymentCaptured(PaymentEntity),
    PaymentFailed(PaymentEntity),
    PaymentAuthorized(PaymentEntity),
    OrderPaid(OrderEntity),
    Unhandled(String),
}

impl WebhookEvent {
    /// Parses the raw request body of a webhook.
    pub fn from_json(body: &[u8]) -> Result<Self, WebhookError> {
        let envelope = serde_json::from_slice::<WebhookEnvelope>(body)
            .map_err(|e| WebhookError::InvalidEnvelope(e.to_string()))?;
        Self::from_envelope(envelope)
    }

    pub fn from_envelope(envelope: WebhookEnvelope) -> Result<Self, WebhookError> {
        let WebhookEnvelope { event, payload } = envelope;
        match event.as_str() {
            PAYMENT_CAPTURED => Ok(Self::PaymentCaptured(payment_from(&event, payload)?)),
            PAYMENT_FAILED => Ok(Self::PaymentFailed(payment_from(&event, payload)?)),
            PAYMENT_AUTHORIZED => Ok(Self::PaymentAuthorized(payment_from(&event, payload)?)),
            ORDER_PAID => {
                let p = parse_payload::<OrderPayload>(&event, payload)?;
                Ok(Self::OrderPaid(p.order.into_inner()))
            },
            _ => Ok(Self::Unhandled(event)),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::PaymentCaptured(_) => PAYMENT_CAPTURED,
            Self::PaymentFailed(_) => PAYMENT_FAILED,
            Self::PaymentAuthorized(_) => PAYMENT_AUTHORIZED,
            Self::OrderPaid(_) => ORDER_PAID,
            Self::Unhandled(e) => e.as_str(),
        }
    }

    /// The order the event refers to, if the event is one we handle.
    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            Self::PaymentCaptured(p) | Self::PaymentFailed(p) | Self::PaymentAuthorized(p) => Some(&p.order_id),
            Self::OrderPaid(o) => Some(&o.id),
            Self::Unhandled(_) => None,
        }
    }
}

fn parse_payload<T: DeserializeOwned>(event: &str, payload: Value) -> Result<T, WebhookError> {
    serde_json::from_value::<T>(payload)
        .map_err(|e| WebhookError::InvalidPayload { event: event.to_string(), reason: e.to_string() })
}

fn payment_from(event: &str, payload: Value) -> Result<PaymentEntity, WebhookError> {
    parse_payload::<PaymentPayload>(event, payload).map(|p| p.payment.into_inner())
}
