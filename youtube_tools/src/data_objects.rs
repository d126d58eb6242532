use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::helpers::{best_thumbnail, format_view_count, parse_duration, playlist_url, watch_url};

//--------------------------------------   YouTube API objects   -------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Thumbnails {
    pub high: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snippet {
    pub title: String,
    pub description: String,
    pub published_at: String,
    pub channel_title: String,
    pub thumbnails: Thumbnails,
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
    #[serde(default)]
    pub snippet: Snippet,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub snippet: Snippet,
}

impl PlaylistItem {
    pub fn video_id(&self) -> Option<&str> {
        self.snippet.resource_id.as_ref().and_then(|r| r.video_id.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistContentDetails {
    #[serde(default)]
    pub item_count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResource {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub content_details: PlaylistContentDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoContentDetails {
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    /// The API sends counts as strings.
    pub view_count: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
    pub id: String,
    #[serde(default)]
    pub content_details: VideoContentDetails,
    #[serde(default)]
    pub statistics: VideoStatistics,
}

/// Any `*.list` response. Only the fields the client reads are kept.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

//--------------------------------------      Site objects       -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub published_at: String,
    pub duration: String,
    pub view_count: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_title: Option<String>,
}

impl Video {
    /// Builds a video from its snippet, looking up duration and views in `details`. Videos without details (deleted
    /// or private ones, usually) show `0:00` and `0`.
    pub fn from_snippet(id: &str, snippet: &Snippet, details: &HashMap<String, VideoResource>) -> Self {
        let details = details.get(id);
        let duration = details.and_then(|d| d.content_details.duration.as_deref()).unwrap_or("PT0S");
        let views = details.and_then(|d| d.statistics.view_count.as_deref()).unwrap_or("0");
        Self {
            id: id.to_string(),
            title: snippet.title.clone(),
            description: snippet.description.clone(),
            thumbnail: best_thumbnail(&snippet.thumbnails),
            published_at: snippet.published_at.clone(),
            duration: parse_duration(duration),
            view_count: format_view_count(views),
            url: watch_url(id),
            channel_title: None,
            playlist_title: None,
        }
    }

    pub fn with_channel_title(mut self, title: &str) -> Self {
        self.channel_title = Some(title.to_string());
        self
    }

    pub fn with_playlist_title(mut self, title: &str) -> Self {
        self.playlist_title = Some(title.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub video_count: u64,
    pub url: String,
    pub published_at: String,
}

impl From<PlaylistResource> for Playlist {
    fn from(p: PlaylistResource) -> Self {
        Self {
            url: playlist_url(&p.id),
            thumbnail: best_thumbnail(&p.snippet.thumbnails),
            title: p.snippet.title,
            description: p.snippet.description,
            video_count: p.content_details.item_count,
            published_at: p.snippet.published_at,
            id: p.id,
        }
    }
}
