use std::path::PathBuf;

use crate::error::AppError;
use crate::progress::percent_to_fraction;

/// One user submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub destination: PathBuf,
}

/// A video format offered by the engine (video streams only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSummary {
    pub format_id: String,
    pub ext: String,
    pub resolution: String,
    /// Bytes, 0 when the engine does not know
    pub filesize: u64,
}

/// Snapshot of a single video's details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub uploader: String,
    pub duration_seconds: u64,
    pub view_count: u64,
    /// `YYYYMMDD`, or "unknown"
    pub upload_date: String,
    /// Size of the representative (≤720p) format
    pub estimated_size_bytes: u64,
    pub description_snippet: String,
    pub source_url: String,
    pub destination: PathBuf,
    pub video_id: Option<String>,
    pub thumbnail_url: Option<String>,
    pub formats: Vec<FormatSummary>,
}

/// Returned instead of [`VideoMetadata`] when the URL points at a playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistNotice {
    pub title: String,
    pub video_count: usize,
    pub first_video_url: Option<String>,
}

/// Result of an info request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoOutcome {
    Video(VideoMetadata),
    Playlist(PlaylistNotice),
    Failed(AppError),
}

/// Terminal result of one download attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success { message: String },
    Failure { error: String },
    PlaylistRejected { error: String, first_video_url: Option<String> },
}

/// Progress forwarded to the UI while a download runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub percent: String,
    pub speed: String,
}

impl ProgressEvent {
    /// Progress as `0.0..=1.0`, if the percent string is numeric
    pub fn fraction(&self) -> Option<f32> {
        percent_to_fraction(&self.percent)
    }
}

/// What a flat listing says about a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Single,
    Collection {
        title: String,
        video_count: usize,
        first_entry_id: Option<String>,
    },
    ClassificationFailed(String),
}

/// Watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
