use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum YoutubeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("YouTube {0} not configured")]
    NotConfigured(&'static str),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("YouTube API error: {status}. {message}")]
    QueryError { status: u16, message: String },
}
