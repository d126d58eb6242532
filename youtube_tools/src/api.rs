use std::{collections::HashMap, sync::Arc};

use log::*;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    config::YoutubeConfig,
    data_objects::{ListResponse, PlaylistItem, PlaylistResource, SearchResult, VideoResource},
    Playlist,
    Video,
    YoutubeApiError,
};

pub const DEFAULT_SEARCH_RESULTS: u32 = 20;
pub const DEFAULT_MAX_RESULTS: u32 = 50;
/// The most items any single list call returns.
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistVideos {
    pub playlist_title: String,
    pub videos: Vec<Video>,
}

#[derive(Clone)]
pub struct YoutubeApi {
    config: YoutubeConfig,
    client: Arc<Client>,
}

impl YoutubeApi {
    pub fn new(config: YoutubeConfig) -> Result<Self, YoutubeApiError> {
        let client = Client::builder().build().map_err(|e| YoutubeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    fn api_key(&self) -> Result<&str, YoutubeApiError> {
        self.config.api_key.as_ref().map(|k| k.reveal().as_str()).ok_or(YoutubeApiError::NotConfigured("API key"))
    }

    fn channel_id(&self) -> Result<&str, YoutubeApiError> {
        self.config.channel_id.as_deref().ok_or(YoutubeApiError::NotConfigured("channel ID"))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    /// Issues a GET against the Data API. The API key is appended to `params`.
    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, YoutubeApiError> {
        let key = self.api_key()?;
        let url = self.url(path);
        trace!("📺️ GET {url} {:?}", params);
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|e| YoutubeApiError::RestResponseError(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(|e| YoutubeApiError::JsonError(e.to_string()))
        } else {
            let message = response.text().await.unwrap_or_default();
            debug!("📺️ YouTube API returned {status}: {message}");
            Err(YoutubeApiError::QueryError { status: status.as_u16(), message })
        }
    }

    /// The channel's videos, newest first.
    pub async fn channel_videos(&self, max_results: u32) -> Result<Vec<Video>, YoutubeApiError> {
        let channel_id = self.channel_id()?;
        self.api_key()?;
        let params = [
            ("channelId", channel_id.to_string()),
            ("part", "snippet".to_string()),
            ("order", "date".to_string()),
            ("maxResults", max_results.to_string()),
            ("type", "video".to_string()),
        ];
        let results = self.rest_query::<ListResponse<SearchResult>>("/search", &params).await?;
        let videos = self.videos_from_search(results.items).await?;
        debug!("📺️ Fetched {} channel videos", videos.len());
        Ok(videos)
    }

    /// Searches the channel's videos, most relevant first.
    pub async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Video>, YoutubeApiError> {
        let channel_id = self.channel_id()?;
        self.api_key()?;
        let params = [
            ("channelId", channel_id.to_string()),
            ("part", "snippet".to_string()),
            ("order", "relevance".to_string()),
            ("maxResults", max_results.to_string()),
            ("type", "video".to_string()),
            ("q", query.to_string()),
        ];
        let results = self.rest_query::<ListResponse<SearchResult>>("/search", &params).await?;
        let videos = self.videos_from_search(results.items).await?;
        debug!("📺️ Search for '{query}' found {} videos", videos.len());
        Ok(videos)
    }

    pub async fn playlists(&self, max_results: u32) -> Result<Vec<Playlist>, YoutubeApiError> {
        let channel_id = self.channel_id()?;
        self.api_key()?;
        let params = [
            ("channelId", channel_id.to_string()),
            ("part", "snippet,contentDetails".to_string()),
            ("maxResults", max_results.to_string()),
        ];
        let results = self.rest_query::<ListResponse<PlaylistResource>>("/playlists", &params).await?;
        Ok(results.items.into_iter().map(Playlist::from).collect())
    }

    /// Fetches up to `max_results` videos of a playlist, following page tokens as needed.
    pub async fn playlist_videos(&self, playlist_id: &str, max_results: u32) -> Result<PlaylistVideos, YoutubeApiError> {
        self.api_key()?;
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let remaining = max_results.saturating_sub(items.len() as u32);
            let mut params = vec![
                ("playlistId", playlist_id.to_string()),
                ("part", "snippet".to_string()),
                ("maxResults", remaining.min(MAX_PAGE_SIZE).to_string()),
            ];
            if let Some(token) = page_token.take() {
                params.push(("pageToken", token));
            }
            let page = self.rest_query::<ListResponse<PlaylistItem>>("/playlistItems", &params).await?;
            if page.items.is_empty() {
                break;
            }
            items.extend(page.items);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) if (items.len() as u32) < max_results => page_token = Some(token),
                _ => break,
            }
        }
        if items.is_empty() {
            return Ok(PlaylistVideos { playlist_title: String::new(), videos: Vec::new() });
        }
        let ids = items.iter().filter_map(|i| i.video_id().map(str::to_string)).collect::<Vec<_>>();
        let details = self.video_details(&ids).await?;
        let playlist_title = self.playlist_title(playlist_id).await;
        let videos = items
            .iter()
            .filter_map(|item| {
                let id = item.video_id()?;
                Some(Video::from_snippet(id, &item.snippet, &details).with_playlist_title(&playlist_title))
            })
            .collect::<Vec<_>>();
        debug!("📺️ Playlist {playlist_id} ('{playlist_title}') has {} videos", videos.len());
        Ok(PlaylistVideos { playlist_title, videos })
    }

    /// Durations and view counts for the given videos, keyed by video id.
    pub async fn video_details(&self, ids: &[String]) -> Result<HashMap<String, VideoResource>, YoutubeApiError> {
        let mut result = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_PAGE_SIZE as usize) {
            let params = [("id", chunk.join(",")), ("part", "contentDetails,statistics".to_string())];
            let page = self.rest_query::<ListResponse<VideoResource>>("/videos", &params).await?;
            result.extend(page.items.into_iter().map(|v| (v.id.clone(), v)));
        }
        Ok(result)
    }

    /// The playlist's title, or an empty string if it cannot be fetched.
    async fn playlist_title(&self, playlist_id: &str) -> String {
        let params = [("id", playlist_id.to_string()), ("part", "snippet".to_string())];
        match self.rest_query::<ListResponse<PlaylistResource>>("/playlists", &params).await {
            Ok(list) => list.items.into_iter().next().map(|p| p.snippet.title).unwrap_or_default(),
            Err(e) => {
                warn!("📺️ Could not fetch the title of playlist {playlist_id}. {e}");
                String::new()
            },
        }
    }

    async fn videos_from_search(&self, results: Vec<SearchResult>) -> Result<Vec<Video>, YoutubeApiError> {
        if results.is_empty() {
            return Ok(Vec::new());
        }
        let ids = results.iter().filter_map(|r| r.id.video_id.clone()).collect::<Vec<_>>();
        let details = self.video_details(&ids).await?;
        let videos = results
            .iter()
            .filter_map(|r| {
                let id = r.id.video_id.as_deref()?;
                Some(Video::from_snippet(id, &r.snippet, &details).with_channel_title(&r.snippet.channel_title))
            })
            .collect();
        Ok(videos)
    }
}
