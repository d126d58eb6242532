//! A small client for the parts of the YouTube Data API v3 that the Yobaexo site shows: the channel's latest videos,
//! search within the channel, the channel's playlists and the videos in a playlist.
//!
//! The raw API objects live in [`data_objects`]. [`YoutubeApi`] flattens them into [`Video`] and [`Playlist`], with
//! durations and view counts already formatted for display.
mod api;
mod config;
pub mod data_objects;
mod error;
pub mod helpers;

pub use api::{PlaylistVideos, YoutubeApi, DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_RESULTS, MAX_PAGE_SIZE};
pub use config::YoutubeConfig;
pub use data_objects::{Playlist, Video};
pub use error::YoutubeApiError;
