use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// India Standard Time, UTC+05:30. The contact form's recipient reads times in this zone.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub category: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateParams {
    pub from_name: String,
    pub from_email: String,
    pub subject: String,
    pub category: String,
    pub message: String,
    pub time: String,
    pub to_email: String,
}

impl ContactMessage {
    pub fn into_template_params(self, sent_at: DateTime<Utc>, to_email: &str) -> TemplateParams {
        TemplateParams {
            from_name: self.name,
            from_email: self.email,
            subject: self.subject,
            category: self.category,
            message: self.message,
            time: local_time(sent_at),
            to_email: to_email.to_string(),
        }
    }
}

/// Formats the time as it reads on an Indian wall clock, e.g. `6/1/2024, 5:30:00 PM`.
pub fn local_time(at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(IST_OFFSET_SECS) {
        Some(ist) => at.with_timezone(&ist).format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        None => at.to_rfc3339(),
    }
}

/// The body of `POST /email/send`.
#[derive(Debug, Clone, Serialize)]
pub struct SendEmailRequest {
    pub service_id: String,
    pub template_id: String,
    pub user_id: String,
    pub template_params: TemplateParams,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}
