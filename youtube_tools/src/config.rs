use log::*;
use yobaexo_common::Secret;

pub const DEFAULT_YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Both values are optional. The server starts without them, and the endpoints that need them report the missing
/// value when called.
#[derive(Debug, Clone, Default)]
pub struct YoutubeConfig {
    pub api_key: Option<Secret<String>>,
    pub channel_id: Option<String>,
    pub api_url: String,
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl YoutubeConfig {
    pub fn new(api_key: Option<Secret<String>>, channel_id: Option<String>) -> Self {
        Self { api_key, channel_id, api_url: DEFAULT_YOUTUBE_API_URL.to_string() }
    }

    pub fn from_env() -> Self {
        let api_key = optional_env("YOBA_YOUTUBE_API_KEY").map(Secret::new);
        if api_key.is_none() {
            warn!("📺️ YOBA_YOUTUBE_API_KEY is not set. The YouTube endpoints will return errors.");
        }
        let channel_id = optional_env("YOBA_YOUTUBE_CHANNEL_ID");
        if channel_id.is_none() {
            warn!("📺️ YOBA_YOUTUBE_CHANNEL_ID is not set. Channel video, search and playlist listings are disabled.");
        }
        let api_url = optional_env("YOBA_YOUTUBE_API_URL").unwrap_or_else(|| DEFAULT_YOUTUBE_API_URL.to_string());
        Self { api_key, channel_id, api_url }
    }
}
