use log::*;
use yobaexo_common::Secret;

use crate::RazorpayApiError;

pub const DEFAULT_RAZORPAY_API_URL: &str = "https://api.razorpay.com/v1";

#[derive(Debug, Clone, Default)]
pub struct RazorpayConfig {
    /// The public key id. It is handed to the browser checkout, so it is not a secret.
    pub key_id: String,
    /// Authenticates API calls and signs checkout callbacks.
    pub key_secret: Secret<String>,
    /// Signs webhook bodies. Configured separately in the Razorpay dashboard.
    pub webhook_secret: Secret<String>,
    pub api_url: String,
}

fn required_env(name: &str) -> Result<String, RazorpayApiError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => {
            error!("🪛️ {name} is not set. The payment gateway cannot be used without it.");
            Err(RazorpayApiError::MissingConfiguration(name.to_string()))
        },
    }
}

impl RazorpayConfig {
    pub fn new<S: Into<String>>(key_id: S, key_secret: Secret<String>, webhook_secret: Secret<String>) -> Self {
        Self { key_id: key_id.into(), key_secret, webhook_secret, api_url: DEFAULT_RAZORPAY_API_URL.to_string() }
    }

    /// Reads the gateway credentials from the environment. Unlike most settings, these have no usable default, so a
    /// missing value is an error.
    pub fn try_from_env() -> Result<Self, RazorpayApiError> {
        let key_id = required_env("YOBA_RAZORPAY_KEY_ID")?;
        let key_secret = Secret::new(required_env("YOBA_RAZORPAY_KEY_SECRET")?);
        let webhook_secret = Secret::new(required_env("YOBA_RAZORPAY_WEBHOOK_SECRET")?);
        let api_url = std::env::var("YOBA_RAZORPAY_API_URL").unwrap_or_else(|_| {
            debug!("🪛️ YOBA_RAZORPAY_API_URL is not set. Using {DEFAULT_RAZORPAY_API_URL}");
            DEFAULT_RAZORPAY_API_URL.to_string()
        });
        Ok(Self { key_id, key_secret, webhook_secret, api_url })
    }
}
