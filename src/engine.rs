//! Boundary to the external extraction engine (yt-dlp).
//!
//! [`MediaEngine`] is what the rest of the application talks to; [`YtDlp`]
//! drives the real `yt-dlp` program as a child process.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use rust_embed::RustEmbed;
use serde::Deserialize;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    process::Command,
};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::model::{Classification, DownloadRequest};
use crate::progress::{PROGRESS_TEMPLATE, ProgressTick, parse_progress_from_line};

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

/// Raw `yt-dlp -J` document, reduced to the fields the application reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInfo {
    #[serde(rename = "_type")]
    pub kind: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub duration: Option<f64>,
    pub view_count: Option<u64>,
    pub upload_date: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub formats: Option<Vec<RawFormat>>,
    pub entries: Option<Vec<RawEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFormat {
    pub format_id: Option<String>,
    pub ext: Option<String>,
    pub resolution: Option<String>,
    pub height: Option<u32>,
    pub vcodec: Option<String>,
    pub filesize: Option<u64>,
    pub filesize_approx: Option<u64>,
}

impl RawFormat {
    /// Formats without a video codec are audio-only.
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    pub fn size(&self) -> u64 {
        self.filesize.or(self.filesize_approx).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntry {
    pub id: Option<String>,
}

/// How a download should be invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// yt-dlp output template, e.g. `<dir>/%(title)s.%(ext)s`
    pub output_template: String,
    /// yt-dlp format expression
    pub format: String,
    /// Whether a video URL carrying a `list=` parameter pulls in the whole list
    pub follow_playlist: bool,
}

/// Progress sink handed to [`MediaEngine::download`].
pub type ProgressSink<'a> = &'a (dyn Fn(ProgressTick) + Send + Sync);

#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Cheap, non-recursive listing used to tell videos from playlists.
    async fn flat_listing(&self, url: &str) -> Result<RawInfo, EngineError>;

    /// Full metadata including the format list.
    async fn extract(&self, url: &str) -> Result<RawInfo, EngineError>;

    /// Downloads `request.url`, calling `sink` for every progress tick.
    async fn download(
        &self,
        request: &DownloadRequest,
        options: &DownloadOptions,
        sink: ProgressSink<'_>,
    ) -> Result<(), EngineError>;

    /// Engine version string, used as an availability check.
    async fn version(&self) -> Result<String, EngineError>;
}

/// Classifies a flat listing as a single video or a playlist.
pub fn classify(listing: &RawInfo) -> Classification {
    if listing.kind.as_deref() != Some("playlist") {
        return Classification::Single;
    }
    let entries = listing.entries.as_deref().unwrap_or_default();
    Classification::Collection {
        title: listing
            .title
            .clone()
            .unwrap_or_else(|| "Unknown Playlist".to_string()),
        video_count: entries.len(),
        first_entry_id: entries.first().and_then(|e| e.id.clone()),
    }
}

/// [`MediaEngine`] backed by the `yt-dlp` executable.
pub struct YtDlp {
    configured: Option<PathBuf>,
    resolved: OnceCell<PathBuf>,
}

impl YtDlp {
    pub fn new(configured: Option<PathBuf>) -> Self {
        Self {
            configured,
            resolved: OnceCell::new(),
        }
    }

    fn binary(&self) -> &Path {
        self.resolved
            .get_or_init(|| resolve_binary(self.configured.as_deref()))
    }

    async fn run_json(&self, args: Vec<String>) -> Result<RawInfo, EngineError> {
        debug!(binary = %self.binary().display(), ?args, "running yt-dlp");
        let out = Command::new(self.binary())
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(EngineError::Spawn)?;
        // Non-zero exit carries the reason on stderr
        if !out.status.success() {
            return Err(EngineError::from_exit(
                out.status,
                &String::from_utf8_lossy(&out.stderr),
            ));
        }
        Ok(serde_json::from_slice(&out.stdout)?)
    }
}

#[async_trait]
impl MediaEngine for YtDlp {
    async fn flat_listing(&self, url: &str) -> Result<RawInfo, EngineError> {
        self.run_json(flat_listing_args(url)).await
    }

    async fn extract(&self, url: &str) -> Result<RawInfo, EngineError> {
        self.run_json(extract_args(url)).await
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        options: &DownloadOptions,
        sink: ProgressSink<'_>,
    ) -> Result<(), EngineError> {
        let args = download_args(request, options);
        info!(url = %request.url, destination = %request.destination.display(), "starting yt-dlp download");

        // yt-dlp must not outlive a download that already returned
        let mut child = Command::new(self.binary())
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(EngineError::Spawn)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("yt-dlp stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("yt-dlp stderr not captured"))?;

        // stderr is drained on its own task so a chatty engine cannot block on a full pipe
        let stderr_task = tokio::spawn(async move {
            let mut collected = String::new();
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            while let Ok(Some(line)) = read_lossy_line(&mut reader, &mut buf).await {
                debug!(target: "yt-dlp", "{}", line);
                collected.push_str(&line);
                collected.push('\n');
            }
            collected
        });

        // Progress lines go to the sink, everything else to the log
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        while let Some(line) = read_lossy_line(&mut reader, &mut buf).await? {
            match parse_progress_from_line(&line) {
                Some(tick) => sink(tick),
                None => debug!(target: "yt-dlp", "{}", line),
            }
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();
        if status.success() {
            Ok(())
        } else {
            Err(EngineError::from_exit(status, &stderr))
        }
    }

    async fn version(&self) -> Result<String, EngineError> {
        let out = Command::new(self.binary())
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(EngineError::Spawn)?;
        if !out.status.success() {
            return Err(EngineError::from_exit(
                out.status,
                &String::from_utf8_lossy(&out.stderr),
            ));
        }
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }
}

/// Reads one line, decoding bytes that are not UTF-8 lossily.
/// Titles in the console code page must not abort the read.
async fn read_lossy_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

pub fn flat_listing_args(url: &str) -> Vec<String> {
    vec![
        "-J".to_owned(),
        "--flat-playlist".to_owned(),
        "--no-warnings".to_owned(),
        "--".to_owned(),
        url.to_owned(),
    ]
}

pub fn extract_args(url: &str) -> Vec<String> {
    vec![
        "-J".to_owned(),
        "--no-warnings".to_owned(),
        "--".to_owned(),
        url.to_owned(),
    ]
}

pub fn download_args(request: &DownloadRequest, options: &DownloadOptions) -> Vec<String> {
    let mut args = vec!["-f".to_owned(), options.format.clone()];
    args.push(if options.follow_playlist { "--yes-playlist" } else { "--no-playlist" }.to_owned());
    args.push("--newline".to_owned());
    args.push("--no-colors".to_owned());
    args.push("--progress-template".to_owned());
    args.push(PROGRESS_TEMPLATE.to_owned());
    args.push("-o".to_owned());
    args.push(options.output_template.clone());
    // nothing after this point is read as an option
    args.push("--".to_owned());
    args.push(request.url.clone());
    args
}

/// Configured path first, then a bundled binary, then `yt-dlp` on `PATH`.
fn resolve_binary(configured: Option<&Path>) -> PathBuf {
    if let Some(path) = configured {
        return path.to_path_buf();
    }
    let bin = if cfg!(target_os = "windows") { "yt-dlp.exe" } else { "yt-dlp" };
    match extract_bundled(bin) {
        Ok(Some(path)) => path,
        Ok(None) => PathBuf::from(bin),
        Err(e) => {
            warn!(error = %e, "could not unpack bundled yt-dlp, using PATH");
            PathBuf::from(bin)
        }
    }
}

fn extract_bundled(bin: &str) -> std::io::Result<Option<PathBuf>> {
    let Some(data) = Asset::get(bin) else {
        return Ok(None);
    };
    let tmp = std::env::temp_dir().join(bin);
    if !tmp.exists() {
        let mut f = File::create(&tmp)?;
        f.write_all(&data.data)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o755))?;
        }
    }
    Ok(Some(tmp))
}
