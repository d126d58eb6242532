use std::sync::Arc;

use chrono::Utc;
use log::*;
use reqwest::Client;

use crate::{config::EmailJsConfig, ContactMessage, EmailJsError, SendEmailRequest};

#[derive(Clone)]
pub struct EmailJsApi {
    config: EmailJsConfig,
    client: Arc<Client>,
}

impl EmailJsApi {
    pub fn new(config: EmailJsConfig) -> Result<Self, EmailJsError> {
        let client = Client::builder().build().map_err(|e| EmailJsError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &EmailJsConfig {
        &self.config
    }

    pub fn send_request(&self, message: ContactMessage) -> Result<SendEmailRequest, EmailJsError> {
        let (Some(public_key), Some(service_id), Some(template_id)) =
            (&self.config.public_key, &self.config.service_id, &self.config.template_id)
        else {
            error!("📧️ EmailJS credentials are missing. Cannot send email.");
            return Err(EmailJsError::NotConfigured);
        };
        Ok(SendEmailRequest {
            service_id: service_id.clone(),
            template_id: template_id.clone(),
            user_id: public_key.clone(),
            template_params: message.into_template_params(Utc::now(), &self.config.contact_email),
            access_token: self.config.private_key.as_ref().map(|k| k.reveal().clone()),
        })
    }

    /// Sends a contact-form message and returns EmailJS's response text (`OK` on success).
    pub async fn send(&self, message: ContactMessage) -> Result<String, EmailJsError> {
        let request = self.send_request(message)?;
        let url = format!("{}/email/send", self.config.api_url.trim_end_matches('/'));
        trace!("📧️ Sending email via {url}");
        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmailJsError::RestResponseError(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| EmailJsError::RestResponseError(e.to_string()))?;
        if status.is_success() {
            info!("📧️ Email sent: {} - {text}", status.as_u16());
            Ok(text)
        } else {
            warn!("📧️ EmailJS returned {status}: {text}");
            Err(EmailJsError::QueryError { status: status.as_u16(), message: text })
        }
    }
}
