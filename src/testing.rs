//! Scripted engine used by the unit tests.

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::engine::{DownloadOptions, MediaEngine, ProgressSink, RawInfo};
use crate::error::EngineError;
use crate::model::DownloadRequest;
use crate::progress::{ProgressStatus, ProgressTick};

pub fn tick(status: ProgressStatus, percent: &str, speed: &str) -> ProgressTick {
    ProgressTick {
        status,
        percent: percent.to_string(),
        speed: speed.to_string(),
    }
}

pub fn video_json() -> RawInfo {
    serde_json::from_str(
        r#"{
            "_type": "video",
            "id": "abc",
            "title": "Clip",
            "uploader": "Someone",
            "duration": 3665,
            "view_count": 1234567,
            "upload_date": "20240315",
            "description": "A short description",
            "thumbnail": "https://i.ytimg.com/vi/abc/hqdefault.jpg",
            "formats": [
                {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a", "filesize": 100},
                {"format_id": "18", "ext": "mp4", "vcodec": "avc1", "height": 360, "filesize": 1000},
                {"format_id": "22", "ext": "mp4", "vcodec": "avc1", "height": 720, "filesize": 2000},
                {"format_id": "137", "ext": "mp4", "vcodec": "avc1", "height": 1080, "filesize": 5000}
            ]
        }"#,
    )
    .unwrap()
}

fn failure(message: &str) -> EngineError {
    EngineError::Failed(message.to_string())
}

#[derive(Default)]
pub struct FakeEngine {
    flat: Option<Result<RawInfo, String>>,
    extract: Option<Result<RawInfo, String>>,
    ticks: Vec<ProgressTick>,
    download_error: Option<String>,
    panic_on_download: bool,
    flat_calls: AtomicUsize,
    extract_calls: AtomicUsize,
    download_calls: AtomicUsize,
    last_download: Mutex<Option<(DownloadRequest, DownloadOptions)>>,
}

impl FakeEngine {
    /// Flat listing reports a single video.
    pub fn single() -> Self {
        Self {
            flat: Some(Ok(RawInfo {
                kind: Some("video".to_string()),
                id: Some("abc".to_string()),
                ..RawInfo::default()
            })),
            extract: Some(Ok(video_json())),
            ..Self::default()
        }
    }

    pub fn playlist(ids: &[&str]) -> Self {
        let entries = ids
            .iter()
            .map(|id| serde_json::json!({ "id": id }))
            .collect::<Vec<_>>();
        let listing = serde_json::json!({ "_type": "playlist", "title": "Mix", "entries": entries });
        Self {
            flat: Some(Ok(serde_json::from_value(listing).unwrap())),
            ..Self::default()
        }
    }

    pub fn with_flat_error(mut self, message: &str) -> Self {
        self.flat = Some(Err(message.to_string()));
        self
    }

    pub fn with_extract(mut self, info: RawInfo) -> Self {
        self.extract = Some(Ok(info));
        self
    }

    pub fn with_extract_error(mut self, message: &str) -> Self {
        self.extract = Some(Err(message.to_string()));
        self
    }

    pub fn with_ticks(mut self, ticks: Vec<ProgressTick>) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn with_download_error(mut self, message: &str) -> Self {
        self.download_error = Some(message.to_string());
        self
    }

    pub fn panicking_download(mut self) -> Self {
        self.panic_on_download = true;
        self
    }

    pub fn flat_calls(&self) -> usize {
        self.flat_calls.load(Ordering::SeqCst)
    }

    pub fn extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.flat_calls() + self.extract_calls() + self.download_calls()
    }

    pub fn last_download(&self) -> Option<(DownloadRequest, DownloadOptions)> {
        self.last_download.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaEngine for FakeEngine {
    async fn flat_listing(&self, _url: &str) -> Result<RawInfo, EngineError> {
        self.flat_calls.fetch_add(1, Ordering::SeqCst);
        match &self.flat {
            Some(Ok(info)) => Ok(info.clone()),
            Some(Err(message)) => Err(failure(message)),
            None => Err(failure("no flat listing scripted")),
        }
    }

    async fn extract(&self, _url: &str) -> Result<RawInfo, EngineError> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        match &self.extract {
            Some(Ok(info)) => Ok(info.clone()),
            Some(Err(message)) => Err(failure(message)),
            None => Err(failure("no extraction scripted")),
        }
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        options: &DownloadOptions,
        sink: ProgressSink<'_>,
    ) -> Result<(), EngineError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_download.lock().unwrap() = Some((request.clone(), options.clone()));
        if self.panic_on_download {
            panic!("engine exploded");
        }
        for t in &self.ticks {
            sink(t.clone());
        }
        match &self.download_error {
            Some(message) => Err(failure(message)),
            None => Ok(()),
        }
    }

    async fn version(&self) -> Result<String, EngineError> {
        Ok("2024.08.06".to_string())
    }
}
