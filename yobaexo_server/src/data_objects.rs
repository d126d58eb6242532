use std::fmt::Display;

use chrono::{DateTime, Utc};
use emailjs_tools::ContactMessage;
use serde::{Deserialize, Serialize};
use yobaexo_payment_engine::{
    db_types::{LicenseStatus, MinorUnits, OrderId, PaymentRecord, PaymentStatus},
    helpers::{is_valid_email, non_blank},
    payment_objects::{CheckoutOrder, PaymentHistory, VerifiedPayment},
};
use youtube_tools::{Playlist, Video};

use crate::errors::ServerError;

//----------------------------------------------   Auth  -------------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub license_status: LicenseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserSummary,
    pub token: String,
}

//----------------------------------------------   Payments  ---------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    #[serde(flatten)]
    pub order: CheckoutOrder,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackPaymentResponse {
    pub success: bool,
    pub message: String,
    /// The id of the stored payment record
    pub payment_id: i64,
    pub status: PaymentStatus,
}

impl TrackPaymentResponse {
    pub fn new<S: Display>(message: S, record: &PaymentRecord) -> Self {
        Self { success: true, message: message.to_string(), payment_id: record.id, status: record.status }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentStatusResponse {
    pub success: bool,
    pub payment: PaymentRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order_id: OrderId,
    pub payment_id: Option<String>,
    pub amount: MinorUnits,
    pub currency: String,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
    /// The id of the stored payment record
    pub payment_id: i64,
    pub order_details: OrderDetails,
}

impl From<VerifiedPayment> for VerifyPaymentResponse {
    fn from(verified: VerifiedPayment) -> Self {
        let record = verified.record;
        Self {
            success: true,
            message: "Payment verified and recorded successfully".to_string(),
            payment_id: record.id,
            order_details: OrderDetails {
                order_id: record.order_id,
                payment_id: record.payment_id,
                amount: record.amount,
                currency: record.currency,
                status: record.status,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentHistoryResponse {
    pub success: bool,
    #[serde(flatten)]
    pub history: PaymentHistory,
}

//----------------------------------------------   YouTube  ----------------------------------------------------------
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeQuery {
    pub max_results: Option<String>,
    pub query: Option<String>,
    pub playlist_id: Option<String>,
}

impl YoutubeQuery {
    /// A positive `maxResults`, or `default` if it is missing or not a positive integer. Never more than `cap`.
    pub fn max_results(&self, default: u32, cap: u32) -> u32 {
        self.max_results
            .as_deref()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(default)
            .min(cap)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
    pub success: bool,
    pub videos: Vec<Video>,
    pub total_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VideoListResponse {
    pub fn new(videos: Vec<Video>, empty_message: &str) -> Self {
        let message = videos.is_empty().then(|| empty_message.to_string());
        Self { success: true, total_results: videos.len(), videos, query: None, playlist_title: None, message }
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    pub fn with_playlist_title(mut self, title: String) -> Self {
        self.playlist_title = Some(title);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistListResponse {
    pub success: bool,
    pub playlists: Vec<Playlist>,
    pub total_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PlaylistListResponse {
    pub fn new(playlists: Vec<Playlist>) -> Self {
        let message = playlists.is_empty().then(|| "No playlists found".to_string());
        Self { success: true, total_results: playlists.len(), playlists, message }
    }
}

//----------------------------------------------   Email  ------------------------------------------------------------
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub category: Option<String>,
    pub message: Option<String>,
}

impl TryFrom<ContactRequest> for ContactMessage {
    type Error = ServerError;

    fn try_from(req: ContactRequest) -> Result<Self, Self::Error> {
        let field = |v: &Option<String>| non_blank(v.as_deref()).map(str::to_string);
        let (Some(name), Some(email), Some(subject), Some(category), Some(message)) =
            (field(&req.name), field(&req.email), field(&req.subject), field(&req.category), field(&req.message))
        else {
            return Err(ServerError::ValidationError(
                "All fields (name, email, subject, category, message) are required".to_string(),
            ));
        };
        if !is_valid_email(&email) {
            return Err(ServerError::ValidationError("Invalid email format".to_string()));
        }
        Ok(ContactMessage { name, email, subject, category, message })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success: bool,
    pub message: String,
    pub email_id: String,
}
