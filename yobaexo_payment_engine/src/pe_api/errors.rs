use thiserror::Error;

use crate::{
    db::{AccountApiError, PaymentStoreError},
    db_types::OrderId,
    gateway::GatewayError,
    webhooks::WebhookError,
};

#[derive(Debug, Clone, Error)]
pub enum PaymentFlowError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid payment signature")]
    InvalidSignature,
    #[error("Order {0} not found or not paid")]
    OrderNotPaid(OrderId),
    #[error("Payment record not found")]
    PaymentNotFound,
    #[error("Invalid webhook: {0}")]
    InvalidWebhook(#[from] WebhookError),
    #[error("Payment store error: {0}")]
    Store(#[from] PaymentStoreError),
    #[error("Account error: {0}")]
    Account(#[from] AccountApiError),
    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl PaymentFlowError {
    /// True for errors caused by the caller's input, as opposed to a failing dependency.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) |
                Self::InvalidSignature |
                Self::OrderNotPaid(_) |
                Self::PaymentNotFound |
                Self::InvalidWebhook(_)
        )
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("An account with this email already exists")]
    EmailAlreadyExists,
    #[error("Could not process password: {0}")]
    PasswordHashError(String),
    #[error("Account error: {0}")]
    Account(AccountApiError),
}

impl From<AccountApiError> for AuthApiError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::EmailAlreadyExists(_) => AuthApiError::EmailAlreadyExists,
            e => AuthApiError::Account(e),
        }
    }
}
