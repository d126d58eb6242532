use log::*;
use yobaexo_common::Secret;

pub const DEFAULT_EMAILJS_API_URL: &str = "https://api.emailjs.com/api/v1.0";
pub const DEFAULT_CONTACT_EMAIL: &str = "info@yobaexo.com";

#[derive(Debug, Clone)]
pub struct EmailJsConfig {
    pub public_key: Option<String>,
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    /// Sent as `accessToken`. Needed when the EmailJS account only allows server-side sends with a private key.
    pub private_key: Option<Secret<String>>,
    /// Where contact-form messages are delivered.
    pub contact_email: String,
    pub api_url: String,
}

impl Default for EmailJsConfig {
    fn default() -> Self {
        Self {
            public_key: None,
            service_id: None,
            template_id: None,
            private_key: None,
            contact_email: DEFAULT_CONTACT_EMAIL.to_string(),
            api_url: DEFAULT_EMAILJS_API_URL.to_string(),
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl EmailJsConfig {
    pub fn from_env() -> Self {
        let config = Self {
            public_key: optional_env("YOBA_EMAILJS_PUBLIC_KEY"),
            service_id: optional_env("YOBA_EMAILJS_SERVICE_ID"),
            template_id: optional_env("YOBA_EMAILJS_TEMPLATE_ID"),
            private_key: optional_env("YOBA_EMAILJS_PRIVATE_KEY").map(Secret::new),
            contact_email: optional_env("YOBA_CONTACT_EMAIL").unwrap_or_else(|| DEFAULT_CONTACT_EMAIL.to_string()),
            api_url: optional_env("YOBA_EMAILJS_API_URL").unwrap_or_else(|| DEFAULT_EMAILJS_API_URL.to_string()),
        };
        if !config.is_configured() {
            warn!("📧️ EmailJS credentials are incomplete. The contact form will not send email.");
        }
        config
    }

    pub fn is_configured(&self) -> bool {
        self.public_key.is_some() && self.service_id.is_some() && self.template_id.is_some()
    }
}
