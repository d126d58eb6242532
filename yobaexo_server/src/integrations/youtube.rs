use youtube_tools::{Playlist, PlaylistVideos, Video, YoutubeApi, YoutubeApiError};

/// The read-only video catalogue shown on the site.
#[allow(async_fn_in_trait)]
pub trait VideoCatalog {
    async fn channel_videos(&self, max_results: u32) -> Result<Vec<Video>, YoutubeApiError>;
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Video>, YoutubeApiError>;
    async fn playlists(&self, max_results: u32) -> Result<Vec<Playlist>, YoutubeApiError>;
    async fn playlist_videos(&self, playlist_id: &str, max_results: u32) -> Result<PlaylistVideos, YoutubeApiError>;
}

impl VideoCatalog for YoutubeApi {
    async fn channel_videos(&self, max_results: u32) -> Result<Vec<Video>, YoutubeApiError> {
        YoutubeApi::channel_videos(self, max_results).await
    }

    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Video>, YoutubeApiError> {
        YoutubeApi::search(self, query, max_results).await
    }

    async fn playlists(&self, max_results: u32) -> Result<Vec<Playlist>, YoutubeApiError> {
        YoutubeApi::playlists(self, max_results).await
    }

    async fn playlist_videos(&self, playlist_id: &str, max_results: u32) -> Result<PlaylistVideos, YoutubeApiError> {
        YoutubeApi::playlist_videos(self, playlist_id, max_results).await
    }
}
