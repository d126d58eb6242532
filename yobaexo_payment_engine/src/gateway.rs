//! The payment gateway, as seen by the payment flow.
//!
//! The engine never talks HTTP itself. The server supplies an implementation of [`PaymentGateway`] backed by the
//! gateway's REST client, and tests supply mocks.
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::{JsonMap, MinorUnits, OrderId};

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Order {0} is unknown to the payment gateway")]
    OrderNotFound(OrderId),
    #[error("The payment gateway rejected the request: {0}")]
    Rejected(String),
    #[error("The payment gateway could not be reached: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayOrderStatus {
    Created,
    Attempted,
    Paid,
}

impl Display for GatewayOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Attempted => write!(f, "attempted"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

/// An order as the gateway reports it. This is the authoritative view of whether an order has been paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: OrderId,
    pub amount: MinorUnits,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: GatewayOrderStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGatewayOrder {
    pub amount: MinorUnits,
    pub currency: String,
    pub receipt: String,
    pub notes: JsonMap,
}

#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn create_order(&self, order: NewGatewayOrder) -> Result<GatewayOrder, GatewayError>;

    async fn fetch_order(&self, order_id: &OrderId) -> Result<GatewayOrder, GatewayError>;
}
