use std::sync::OnceLock;

use regex::Regex;

use crate::data_objects::Thumbnails;

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").unwrap_or_else(|_| unreachable!()))
}

/// Renders an ISO-8601 duration such as `PT1H2M3S` as `1:02:03`, or `PT4M5S` as `4:05`. Anything unparseable
/// becomes `0:00`.
pub fn parse_duration(duration: &str) -> String {
    let Some(caps) = duration_regex().captures(duration) else {
        return "0:00".to_string();
    };
    let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok()).unwrap_or(0);
    let (hours, minutes, seconds) = (part(1), part(2), part(3));
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// `1234567` → `1.2M`, `3400` → `3.4K`, `999` → `999`.
pub fn format_view_count(count: &str) -> String {
    let num = count.trim().parse::<u64>().unwrap_or(0);
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

pub fn playlist_url(playlist_id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={playlist_id}")
}

/// The `high` thumbnail if there is one, then `medium`, else an empty string.
pub fn best_thumbnail(thumbnails: &Thumbnails) -> String {
    thumbnails.high.as_ref().or(thumbnails.medium.as_ref()).map(|t| t.url.clone()).unwrap_or_default()
}
