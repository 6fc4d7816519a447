use std::{path::PathBuf, sync::Arc};

use tokio::{runtime::Handle, task::JoinError, task::JoinHandle};
use tracing::{error, info, warn};

use crate::downloader::Downloader;
use crate::error::AppError;
use crate::format::format_metadata;
use crate::model::{DownloadOutcome, InfoOutcome, VideoMetadata};
use crate::thumbnail::{Thumbnail, fetch_thumbnail, thumbnail_url};
use crate::ui::{StatusKind, UiCommand, UiHandle};
use crate::validator::is_supported_url;

type ThumbnailFetcher = fn(&str) -> Option<Thumbnail>;

/// Routes window events to the model on worker tasks and posts the
/// results back to the UI thread.
///
/// Only one operation is expected at a time. That is enforced by the
/// window disabling its inputs on `DisableInputs`, which is not atomic with
/// the click that started the operation.
pub struct Controller {
    model: Arc<Downloader>,
    runtime: Handle,
    ui: UiHandle,
    fetch_thumbnail: ThumbnailFetcher,
}

impl Controller {
    pub fn new(model: Arc<Downloader>, runtime: Handle, ui: UiHandle) -> Self {
        Self {
            model,
            runtime,
            ui,
            fetch_thumbnail,
        }
    }

    /// Swaps the thumbnail loader.
    pub fn with_thumbnail_fetcher(mut self, fetcher: ThumbnailFetcher) -> Self {
        self.fetch_thumbnail = fetcher;
        self
    }

    pub fn destination(&self) -> PathBuf {
        self.model.destination()
    }

    /// "Download" button.
    pub fn submit_download(&self, url: &str) -> Option<JoinHandle<()>> {
        let url = self.accept_url(url)?;
        info!(%url, "download requested");
        self.begin("Starting download...");

        let model = self.model.clone();
        let ui = self.ui.clone();
        Some(self.runtime.spawn(async move {
            let _restore = RestoreInputs(ui.clone());
            let progress_ui = ui.clone();
            // Inner task so a panic in the model comes back as a JoinError
            let work = tokio::spawn(async move {
                model
                    .download_video(&url, move |progress| {
                        progress_ui.send(UiCommand::SetProgress(progress))
                    })
                    .await
            });
            match work.await {
                Ok(outcome) => render_download(&ui, outcome),
                Err(e) => render_unexpected(&ui, e),
            }
        }))
    }

    /// "Get Info" button.
    pub fn request_info(&self, url: &str) -> Option<JoinHandle<()>> {
        let url = self.accept_url(url)?;
        info!(%url, "video info requested");
        self.begin("Retrieving video information...");

        let model = self.model.clone();
        let ui = self.ui.clone();
        let fetcher = self.fetch_thumbnail;
        Some(self.runtime.spawn(async move {
            let _restore = RestoreInputs(ui.clone());
            let work = tokio::spawn(async move { model.get_video_info(&url).await });
            match work.await {
                Ok(outcome) => render_info(&ui, outcome, fetcher),
                Err(e) => render_unexpected(&ui, e),
            }
        }))
    }

    /// "Clear" button.
    pub fn clear(&self) {
        self.ui.send(UiCommand::ClearForm);
    }

    /// Folder picked in the browse dialog.
    pub fn choose_destination(&self, path: PathBuf) {
        match self.model.set_destination(path.clone()) {
            Ok(()) => {
                self.ui
                    .status(StatusKind::Info, format!("Download folder set to {}", path.display()));
                self.ui.send(UiCommand::SetDestination(path));
            }
            Err(e) => {
                warn!(error = %e, "rejected download folder");
                self.ui.status(StatusKind::Error, e.to_string());
            }
        }
    }

    /// Startup check that yt-dlp can be run at all.
    pub fn check_engine(&self) -> JoinHandle<()> {
        let model = self.model.clone();
        let ui = self.ui.clone();
        self.runtime.spawn(async move {
            match model.engine().version().await {
                Ok(version) => info!(%version, "yt-dlp available"),
                Err(e) => {
                    error!(error = %e, "yt-dlp is not available");
                    ui.status(
                        StatusKind::Error,
                        format!("yt-dlp is not available ({}). Install it with: pip install yt-dlp", e),
                    );
                }
            }
        })
    }

    fn accept_url(&self, url: &str) -> Option<String> {
        let url = url.trim();
        if url.is_empty() {
            self.ui.status(StatusKind::Error, "Please enter a YouTube URL");
            return None;
        }
        if !is_supported_url(url) {
            self.ui.status(StatusKind::Error, "Please enter a valid YouTube URL");
            return None;
        }
        Some(url.to_string())
    }

    fn begin(&self, message: &str) {
        self.ui.send(UiCommand::ShowBusy);
        self.ui.send(UiCommand::DisableInputs);
        self.ui.status(StatusKind::Info, message);
    }
}

/// Hides the busy indicator and re-enables input when the operation ends,
/// however it ends.
struct RestoreInputs(UiHandle);

impl Drop for RestoreInputs {
    fn drop(&mut self) {
        self.0.send(UiCommand::HideBusy);
        self.0.send(UiCommand::EnableInputs);
    }
}

fn render_download(ui: &UiHandle, outcome: DownloadOutcome) {
    match outcome {
        DownloadOutcome::Success { message } => ui.status(StatusKind::Success, message),
        DownloadOutcome::Failure { error } => ui.status(StatusKind::Error, error),
        DownloadOutcome::PlaylistRejected {
            error,
            first_video_url: Some(first),
        } => {
            // Offer the first entry instead
            let message = format!(
                "{}\n\nDid you want to download the first video instead?\nFirst video URL: {}",
                error, first
            );
            ui.status(StatusKind::Error, error);
            ui.send(UiCommand::ShowPlaylistPrompt {
                message,
                suggested_url: first,
            });
        }
        DownloadOutcome::PlaylistRejected {
            error,
            first_video_url: None,
        } => ui.status(StatusKind::Error, error),
    }
}

fn render_info(ui: &UiHandle, outcome: InfoOutcome, fetcher: ThumbnailFetcher) {
    match outcome {
        InfoOutcome::Video(info) => {
            let thumb = thumbnail_url(&info);
            show_metadata(ui, info);
            // Thumbnail follows on a blocking worker
            ui.status(StatusKind::Success, "Video information retrieved successfully");
            if let Some(url) = thumb {
                let ui = ui.clone();
                tokio::task::spawn_blocking(move || {
                    if let Some(thumbnail) = fetcher(&url) {
                        ui.send(UiCommand::ShowThumbnail(thumbnail));
                    }
                });
            }
        }
        InfoOutcome::Playlist(notice) => {
            info!(title = %notice.title, videos = notice.video_count, "info requested for a playlist");
            let message = format!(
                "This is a playlist with {} videos. Please use the direct video URL instead of the playlist URL.",
                notice.video_count
            );
            ui.status(StatusKind::Error, message.clone());
            // No prompt for a playlist without entries
            if let Some(first) = notice.first_video_url {
                ui.send(UiCommand::ShowPlaylistPrompt {
                    message,
                    suggested_url: first,
                });
            }
        }
        InfoOutcome::Failed(e) => ui.status(
            StatusKind::Error,
            format!("Failed to retrieve video information: {}", e),
        ),
    }
}

fn show_metadata(ui: &UiHandle, info: VideoMetadata) {
    let report = format_metadata(&info);
    ui.send(UiCommand::ShowMetadata { info, report });
}

fn render_unexpected(ui: &UiHandle, e: JoinError) {
    // Recover the panic message when there is one
    let text = if e.is_panic() {
        let payload = e.into_panic();
        payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "worker panicked".to_string())
    } else {
        e.to_string()
    };
    error!(error = %text, "worker failed");
    ui.status(StatusKind::Error, AppError::Unexpected(text).to_string());
}
