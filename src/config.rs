use std::path::PathBuf;

/// Environment variable overriding the default download folder.
pub const DOWNLOAD_DIR_ENV: &str = "VIDFETCH_DOWNLOAD_DIR";
/// Environment variable pointing at a specific yt-dlp binary.
pub const YTDLP_ENV: &str = "VIDFETCH_YTDLP";

/// yt-dlp format expression: best single file up to 720p.
pub const QUALITY_FORMAT: &str = "best[height<=720]";
/// Height ceiling used when estimating the download size.
pub const MAX_HEIGHT: u32 = 720;

/// Hosts accepted by the URL validator.
pub const SUPPORTED_HOSTS: &[&str] = &["youtube.com", "youtu.be", "www.youtube.com", "m.youtube.com"];

/// Runtime configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Window title
    pub window_title: String,
    /// Initial window size in logical points
    pub window_size: [f32; 2],
    /// Folder downloads are written to
    pub download_dir: PathBuf,
    /// Explicit yt-dlp binary, if configured
    pub ytdlp_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_title: "YouTube Video Downloader".to_string(),
            window_size: [600.0, 500.0],
            download_dir: default_download_dir(),
            ytdlp_path: None,
        }
    }
}

impl AppConfig {
    /// Defaults with `VIDFETCH_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = lookup(DOWNLOAD_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            config.download_dir = PathBuf::from(dir);
        }
        if let Some(bin) = lookup(YTDLP_ENV).filter(|v| !v.trim().is_empty()) {
            config.ytdlp_path = Some(PathBuf::from(bin));
        }
        config
    }
}

/// `~/Downloads/YouTube_Videos`, falling back to the working directory
/// when no home directory can be determined.
pub fn default_download_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Downloads")
        .join("YouTube_Videos")
}
