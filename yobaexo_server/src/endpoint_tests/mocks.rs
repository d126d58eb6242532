use emailjs_tools::{ContactMessage, EmailJsError};
use mockall::mock;
use yobaexo_payment_engine::{db_types::OrderId, GatewayError, GatewayOrder, NewGatewayOrder, PaymentGateway};
use youtube_tools::{Playlist, PlaylistVideos, Video, YoutubeApiError};

use crate::integrations::{ContactMailer, VideoCatalog};

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn create_order(&self, order: NewGatewayOrder) -> Result<GatewayOrder, GatewayError>;
        async fn fetch_order(&self, order_id: &OrderId) -> Result<GatewayOrder, GatewayError>;
    }
}

mock! {
    pub Catalog {}
    impl VideoCatalog for Catalog {
        async fn channel_videos(&self, max_results: u32) -> Result<Vec<Video>, YoutubeApiError>;
        async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Video>, YoutubeApiError>;
        async fn playlists(&self, max_results: u32) -> Result<Vec<Playlist>, YoutubeApiError>;
        async fn playlist_videos(&self, playlist_id: &str, max_results: u32) -> Result<PlaylistVideos, YoutubeApiError>;
    }
}

mock! {
    pub Mailer {}
    impl ContactMailer for Mailer {
        async fn send_contact_message(&self, message: ContactMessage) -> Result<String, EmailJsError>;
    }
}
