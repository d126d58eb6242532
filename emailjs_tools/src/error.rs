use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EmailJsError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Email service not configured")]
    NotConfigured,
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("EmailJS rejected the request. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl EmailJsError {
    /// The upstream HTTP status, if EmailJS answered at all.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::QueryError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
