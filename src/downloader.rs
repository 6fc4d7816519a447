use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use tracing::{debug, info, warn};

use crate::config::{MAX_HEIGHT, QUALITY_FORMAT};
use crate::engine::{DownloadOptions, MediaEngine, RawFormat, RawInfo, classify};
use crate::error::AppError;
use crate::model::{
    Classification, DownloadOutcome, DownloadRequest, FormatSummary, InfoOutcome, PlaylistNotice,
    ProgressEvent, VideoMetadata, watch_url,
};
use crate::progress::{ProgressStatus, ProgressTick};
use crate::validator::is_supported_url;

const DESCRIPTION_LIMIT: usize = 200;

/// Application model: owns the download folder and runs engine operations.
pub struct Downloader {
    engine: Arc<dyn MediaEngine>,
    destination: RwLock<PathBuf>,
}

impl Downloader {
    /// Creates the model, making sure `destination` exists.
    pub fn new(engine: Arc<dyn MediaEngine>, destination: PathBuf) -> Result<Self, AppError> {
        ensure_dir(&destination)?;
        Ok(Self {
            engine,
            destination: RwLock::new(destination),
        })
    }

    pub fn destination(&self) -> PathBuf {
        self.destination
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_destination(&self, path: PathBuf) -> Result<(), AppError> {
        ensure_dir(&path)?;
        info!(destination = %path.display(), "download folder changed");
        *self.destination.write().unwrap_or_else(|e| e.into_inner()) = path;
        Ok(())
    }

    pub fn engine(&self) -> &Arc<dyn MediaEngine> {
        &self.engine
    }

    /// Flat listing turned into a tagged classification; never fails.
    pub async fn classify(&self, url: &str) -> Classification {
        match self.engine.flat_listing(url).await {
            Ok(listing) => classify(&listing),
            Err(e) => Classification::ClassificationFailed(e.to_string()),
        }
    }

    pub async fn get_video_info(&self, url: &str) -> InfoOutcome {
        // Playlists are answered from the flat listing alone
        match self.classify(url).await {
            Classification::Collection {
                title,
                video_count,
                first_entry_id,
            } => {
                return InfoOutcome::Playlist(PlaylistNotice {
                    title,
                    video_count,
                    first_video_url: first_entry_id.as_deref().map(watch_url),
                });
            }
            Classification::ClassificationFailed(reason) => {
                warn!(%url, %reason, "error getting video info");
                return InfoOutcome::Failed(AppError::RetrievalFailed(reason));
            }
            Classification::Single => {}
        }

        // Full extraction for a single video
        match self.engine.extract(url).await {
            Ok(info) => InfoOutcome::Video(self.metadata_from(info, url)),
            Err(e) => {
                warn!(%url, error = %e, "error getting video info");
                InfoOutcome::Failed(AppError::RetrievalFailed(e.to_string()))
            }
        }
    }

    pub async fn download_video<F>(&self, url: &str, on_progress: F) -> DownloadOutcome
    where
        F: Fn(ProgressEvent) + Send + Sync,
    {
        if !is_supported_url(url) {
            return DownloadOutcome::Failure {
                error: AppError::InvalidUrl.to_string(),
            };
        }

        // Best effort: a failing pre-check must not block the download.
        match self.classify(url).await {
            Classification::Collection {
                video_count,
                first_entry_id,
                ..
            } => {
                info!(%url, video_count, "refusing playlist download");
                return DownloadOutcome::PlaylistRejected {
                    error: AppError::CollectionNotSupported { count: video_count }.to_string(),
                    first_video_url: first_entry_id.as_deref().map(watch_url),
                };
            }
            Classification::ClassificationFailed(reason) => {
                debug!(%url, %reason, "playlist check failed, downloading anyway");
            }
            Classification::Single => {}
        }

        // Destination is read once for the whole download
        let request = DownloadRequest {
            url: url.to_string(),
            destination: self.destination(),
        };
        let options = DownloadOptions {
            output_template: request
                .destination
                .join("%(title)s.%(ext)s")
                .to_string_lossy()
                .into_owned(),
            format: QUALITY_FORMAT.to_string(),
            follow_playlist: false,
        };
        // Only "downloading" ticks reach the window
        let sink = |tick: ProgressTick| {
            if tick.status == ProgressStatus::Downloading {
                on_progress(ProgressEvent {
                    percent: tick.percent,
                    speed: tick.speed,
                });
            }
        };

        match self.engine.download(&request, &options, &sink).await {
            Ok(()) => {
                info!(%url, destination = %request.destination.display(), "download finished");
                DownloadOutcome::Success {
                    message: format!(
                        "Video downloaded successfully to {}",
                        request.destination.display()
                    ),
                }
            }
            Err(e) => {
                warn!(%url, error = %e, "download failed");
                DownloadOutcome::Failure {
                    error: AppError::DownloadFailed(e.to_string()).to_string(),
                }
            }
        }
    }

    fn metadata_from(&self, info: RawInfo, url: &str) -> VideoMetadata {
        // Size estimate comes from the format the download would pick
        let formats = info.formats.unwrap_or_default();
        let estimated_size_bytes = representative_format(&formats, MAX_HEIGHT)
            .map(RawFormat::size)
            .unwrap_or(0);
        VideoMetadata {
            title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
            uploader: info
                .uploader
                .unwrap_or_else(|| "Unknown Uploader".to_string()),
            duration_seconds: info.duration.map(|d| d.max(0.0) as u64).unwrap_or(0),
            view_count: info.view_count.unwrap_or(0),
            upload_date: info.upload_date.unwrap_or_else(|| "unknown".to_string()),
            estimated_size_bytes,
            description_snippet: description_snippet(info.description.as_deref()),
            source_url: url.to_string(),
            destination: self.destination(),
            video_id: info.id,
            thumbnail_url: info.thumbnail,
            formats: video_formats(&formats),
        }
    }
}

/// Highest video format not above `max_height`; the first one seen wins a tie.
pub fn representative_format(formats: &[RawFormat], max_height: u32) -> Option<&RawFormat> {
    let mut best: Option<&RawFormat> = None;
    for fmt in formats.iter().filter(|f| f.has_video()) {
        let height = fmt.height.unwrap_or(0);
        if height > max_height {
            continue;
        }
        if best.is_none_or(|b| height > b.height.unwrap_or(0)) {
            best = Some(fmt);
        }
    }
    best
}

fn video_formats(formats: &[RawFormat]) -> Vec<FormatSummary> {
    formats
        .iter()
        .filter(|f| f.has_video())
        .map(|f| FormatSummary {
            format_id: f.format_id.clone().unwrap_or_default(),
            ext: f.ext.clone().unwrap_or_default(),
            resolution: f.resolution.clone().unwrap_or_else(|| "Unknown".to_string()),
            filesize: f.size(),
        })
        .collect()
}

fn description_snippet(description: Option<&str>) -> String {
    match description.filter(|d| !d.is_empty()) {
        None => "No description available".to_string(),
        Some(d) if d.chars().count() > DESCRIPTION_LIMIT => {
            let cut: String = d.chars().take(DESCRIPTION_LIMIT).collect();
            format!("{}...", cut)
        }
        Some(d) => d.to_string(),
    }
}

fn ensure_dir(path: &Path) -> Result<(), AppError> {
    std::fs::create_dir_all(path).map_err(|e| AppError::Destination {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
