use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RazorpayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Required configuration value {0} is missing")]
    MissingConfiguration(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl RazorpayApiError {
    /// Razorpay answers requests for unknown ids with a 400 `BAD_REQUEST_ERROR`, and unknown paths with a 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::QueryError { status: 400 | 404, .. })
    }
}
