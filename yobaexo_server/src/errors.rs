use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use emailjs_tools::EmailJsError;
use log::{debug, error};
use thiserror::Error;
use yobaexo_payment_engine::{AuthApiError, PaymentFlowError, PaymentStoreError};
use youtube_tools::YoutubeApiError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read query string: {0}")]
    InvalidQuery(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    /// A feature whose credentials were not supplied at start-up.
    #[error("{0}")]
    ServiceNotConfigured(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error(transparent)]
    AuthenticationError(#[from] AuthError),
    #[error("Could not issue access token. {0}")]
    CouldNotIssueAccessToken(String),
    #[error("{0}")]
    NoRecordFound(String),
    #[error("Missing signature")]
    MissingWebhookSignature,
    #[error("Invalid signature")]
    InvalidWebhookSignature,
    /// An upstream service failed. The message is safe to show to clients.
    #[error("{0}")]
    UpstreamError(String),
    /// An upstream service rejected the request with a status worth passing on to the client.
    #[error("{message}")]
    UpstreamRejected { status: u16, message: String },
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::MissingWebhookSignature => StatusCode::BAD_REQUEST,
            Self::InvalidWebhookSignature => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceNotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CouldNotIssueAccessToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("💻️ {status}: {self}");
        } else {
            debug!("💻️ {status}: {self}");
        }
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Unauthorized. No bearer token was provided.")]
    MissingToken,
    #[error("Unauthorized. The bearer token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Unauthorized. The bearer token is invalid or has expired. {0}")]
    ValidationError(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::Validation(msg) => Self::ValidationError(msg),
            AuthApiError::InvalidCredentials => Self::AuthenticationError(AuthError::InvalidCredentials),
            AuthApiError::EmailAlreadyExists => Self::ValidationError("Email already exists".to_string()),
            AuthApiError::PasswordHashError(_) | AuthApiError::Account(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<PaymentFlowError> for ServerError {
    fn from(e: PaymentFlowError) -> Self {
        match e {
            PaymentFlowError::Validation(msg) => Self::ValidationError(msg),
            PaymentFlowError::InvalidSignature => Self::ValidationError(e.to_string()),
            PaymentFlowError::OrderNotPaid(_) => Self::ValidationError("Order not found or not paid".to_string()),
            PaymentFlowError::PaymentNotFound => Self::NoRecordFound("Payment not found".to_string()),
            PaymentFlowError::InvalidWebhook(_) => Self::ValidationError(e.to_string()),
            PaymentFlowError::Store(_) | PaymentFlowError::Account(_) => Self::BackendError(e.to_string()),
            PaymentFlowError::Gateway(_) => Self::UpstreamError(e.to_string()),
        }
    }
}

impl From<PaymentStoreError> for ServerError {
    fn from(e: PaymentStoreError) -> Self {
        Self::BackendError(e.to_string())
    }
}

impl From<YoutubeApiError> for ServerError {
    fn from(e: YoutubeApiError) -> Self {
        match e {
            YoutubeApiError::NotConfigured(_) => Self::ServiceNotConfigured(e.to_string()),
            e => Self::UpstreamError(format!("Failed to fetch YouTube data. {e}")),
        }
    }
}

impl From<EmailJsError> for ServerError {
    fn from(e: EmailJsError) -> Self {
        match e.upstream_status() {
            Some(400) => Self::UpstreamRejected {
                status: 400,
                message: "Invalid email data or template configuration".to_string(),
            },
            Some(401) => Self::UpstreamError("Email service authentication failed".to_string()),
            Some(403) => Self::UpstreamError("Email service access forbidden".to_string()),
            Some(429) => Self::UpstreamRejected {
                status: 429,
                message: "Too many email requests. Please try again later.".to_string(),
            },
            _ => match e {
                EmailJsError::NotConfigured => Self::ServiceNotConfigured(
                    "Email service not configured. Please contact administrator.".to_string(),
                ),
                e => {
                    error!("📧️ Failed to send email. {e}");
                    Self::UpstreamError("Failed to send email".to_string())
                },
            },
        }
    }
}
