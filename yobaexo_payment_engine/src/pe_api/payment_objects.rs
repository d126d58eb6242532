//! Request and response objects for the payment flow and account APIs.
//!
//! Request objects are deserialized straight from client JSON, so every field is optional. Each has a validating
//! conversion into the strongly typed value the engine works with.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    db_types::{JsonMap, MinorUnits, OrderId, Pagination, PaymentRecord, PaymentStatus, DEFAULT_CURRENCY_CODE},
    gateway::NewGatewayOrder,
    helpers::non_blank,
    pe_api::errors::PaymentFlowError,
    state_machine::{TrackingStarted, TrackingUpdated},
};

fn parse_status(status: &str) -> Result<PaymentStatus, PaymentFlowError> {
    status.trim().parse::<PaymentStatus>().map_err(|e| PaymentFlowError::Validation(e.to_string()))
}

fn owned(value: &Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}

//--------------------------------------    CreateOrderRequest    ------------------------------------------------------
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderRequest {
    /// Amount in major units (e.g. rupees). May be fractional.
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub receipt: Option<String>,
}

impl CreateOrderRequest {
    pub fn into_gateway_order(self, user_id: &str, now: DateTime<Utc>) -> Result<NewGatewayOrder, PaymentFlowError> {
        let amount = match self.amount {
            None => return Err(PaymentFlowError::Validation("Amount is required".into())),
            Some(a) if !a.is_finite() || a < 1.0 => {
                return Err(PaymentFlowError::Validation("Minimum amount should be ₹1".into()))
            },
            Some(a) => MinorUnits::try_from_major(a).map_err(|e| PaymentFlowError::Validation(e.to_string()))?,
        };
        let currency = owned(&self.currency).unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string());
        let receipt = owned(&self.receipt).unwrap_or_else(|| format!("receipt_{}", now.timestamp_millis()));
        let mut notes = JsonMap::new();
        notes.insert("userId".into(), Value::String(user_id.to_string()));
        Ok(NewGatewayOrder { amount, currency, receipt, notes })
    }
}

/// What the client needs to open the hosted checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutOrder {
    pub order_id: OrderId,
    pub amount: MinorUnits,
    pub currency: String,
    pub key_id: String,
}

//--------------------------------------    TrackPaymentRequest   ------------------------------------------------------
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackPaymentRequest {
    pub order_id: Option<String>,
    pub amount: Option<MinorUnits>,
    pub currency: Option<String>,
    pub plan_id: Option<String>,
    pub plan_name: Option<String>,
    pub status: Option<String>,
    pub error_message: Option<String>,
}

impl TrackPaymentRequest {
    pub fn into_event(self, user_id: &str) -> Result<TrackingStarted, PaymentFlowError> {
        let amount = self.amount.filter(MinorUnits::is_positive);
        let (Some(order_id), Some(amount)) = (owned(&self.order_id), amount) else {
            return Err(PaymentFlowError::Validation("order_id and amount are required".into()));
        };
        let status = non_blank(self.status.as_deref()).map(parse_status).transpose()?;
        Ok(TrackingStarted {
            user_id: user_id.to_string(),
            order_id: OrderId::from(order_id),
            amount,
            currency: owned(&self.currency),
            plan_id: owned(&self.plan_id),
            plan_name: owned(&self.plan_name),
            status,
            error_message: owned(&self.error_message),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackPaymentUpdateRequest {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub status: Option<String>,
    pub error_message: Option<String>,
    pub payment_details: Option<Value>,
    pub license_details: Option<Value>,
}

impl TrackPaymentUpdateRequest {
    pub fn into_event(self) -> Result<TrackingUpdated, PaymentFlowError> {
        let order_id = owned(&self.order_id).map(OrderId::from);
        let payment_id = owned(&self.payment_id);
        let status = non_blank(self.status.as_deref());
        let Some(status) = status.filter(|_| order_id.is_some() || payment_id.is_some()) else {
            return Err(PaymentFlowError::Validation("status and one of order_id or payment_id are required".into()));
        };
        let status = parse_status(status)?;
        Ok(TrackingUpdated {
            order_id,
            payment_id,
            status,
            error_message: owned(&self.error_message),
            payment_details: self.payment_details.filter(|v| !v.is_null()),
            license_details: self.license_details.filter(|v| !v.is_null()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentLookup {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
}

impl PaymentLookup {
    pub fn by_order<S: Into<String>>(order_id: S) -> Self {
        Self { order_id: Some(order_id.into()), payment_id: None }
    }

    pub fn by_payment<S: Into<String>>(payment_id: S) -> Self {
        Self { order_id: None, payment_id: Some(payment_id.into()) }
    }
}

//--------------------------------------   VerifyPaymentRequest   ------------------------------------------------------
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyPaymentRequest {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
    /// Informational only. The amount recorded is always the one the gateway reports.
    pub amount: Option<Value>,
    pub currency: Option<String>,
}

/// A checkout callback with all its required parts present.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentClaim {
    pub order_id: OrderId,
    pub payment_id: String,
    pub signature: String,
}

impl VerifyPaymentRequest {
    pub fn into_claim(self) -> Result<PaymentClaim, PaymentFlowError> {
        match (owned(&self.order_id), owned(&self.payment_id), owned(&self.signature)) {
            (Some(order_id), Some(payment_id), Some(signature)) => {
                Ok(PaymentClaim { order_id: OrderId::from(order_id), payment_id, signature })
            },
            _ => Err(PaymentFlowError::Validation("order_id, payment_id, and signature are required".into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedPayment {
    pub record: PaymentRecord,
    /// False when the user's licence was already active.
    pub license_activated: bool,
}

//--------------------------------------       PaymentOutcome      -----------------------------------------------------
/// The result of applying an event to the payment store.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Recorded(PaymentRecord),
    NotTracked(Option<OrderId>),
    Ignored(String),
}

//--------------------------------------       PaymentHistory      -----------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: i64,
    pub total_payments: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PageInfo {
    pub fn new(page: Pagination, total: i64) -> Self {
        let total_pages = page.total_pages(total);
        Self {
            current_page: page.page,
            total_pages,
            total_payments: total,
            has_next_page: i64::from(page.page) < total_pages,
            has_previous_page: page.page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentHistory {
    pub payments: Vec<PaymentRecord>,
    pub pagination: PageInfo,
}
