use log::*;
use razorpay_tools::{NewRazorpayOrder, RazorpayApi, RazorpayApiError, RazorpayOrder};
use yobaexo_payment_engine::{
    db_types::{MinorUnits, OrderId},
    GatewayError,
    GatewayOrder,
    GatewayOrderStatus,
    NewGatewayOrder,
    PaymentGateway,
};

/// [`PaymentGateway`] backed by the Razorpay Orders API.
#[derive(Clone)]
pub struct RazorpayGateway {
    api: RazorpayApi,
}

impl RazorpayGateway {
    pub fn new(api: RazorpayApi) -> Self {
        Self { api }
    }
}

/// Converts a Razorpay order into the engine's view of it.
pub fn gateway_order(order: RazorpayOrder) -> Result<GatewayOrder, GatewayError> {
    let status = match order.status.as_str() {
        "created" => GatewayOrderStatus::Created,
        "attempted" => GatewayOrderStatus::Attempted,
        "paid" => GatewayOrderStatus::Paid,
        other => return Err(GatewayError::Rejected(format!("Order {} has unknown status '{other}'", order.id))),
    };
    Ok(GatewayOrder {
        id: OrderId::from(order.id),
        amount: MinorUnits::from(order.amount),
        currency: order.currency,
        receipt: order.receipt,
        status,
    })
}

fn gateway_error(e: RazorpayApiError) -> GatewayError {
    match e {
        RazorpayApiError::QueryError { .. } => GatewayError::Rejected(e.to_string()),
        e => GatewayError::Unavailable(e.to_string()),
    }
}

impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, order: NewGatewayOrder) -> Result<GatewayOrder, GatewayError> {
        let order = NewRazorpayOrder {
            amount: order.amount.value(),
            currency: order.currency,
            receipt: order.receipt,
            notes: order.notes,
        };
        let order = self.api.create_order(order).await.map_err(gateway_error)?;
        gateway_order(order)
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<GatewayOrder, GatewayError> {
        match self.api.fetch_order(order_id.as_str()).await {
            Ok(order) => gateway_order(order),
            Err(e) if e.is_not_found() => {
                debug!("💳️ Razorpay does not know order {order_id}. {e}");
                Err(GatewayError::OrderNotFound(order_id.clone()))
            },
            Err(e) => Err(gateway_error(e)),
        }
    }
}
