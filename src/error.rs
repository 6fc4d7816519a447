use std::process::ExitStatus;

/// Failures raised while talking to the extraction engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start yt-dlp: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("{0}")]
    Failed(String),

    #[error("unreadable yt-dlp output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Builds a `Failed` from the process exit status and its captured stderr.
    /// The last `ERROR:` line wins, since yt-dlp prints warnings before it.
    pub fn from_exit(status: ExitStatus, stderr: &str) -> Self {
        let message = stderr
            .lines()
            .rev()
            .find(|l| l.starts_with("ERROR:"))
            .or_else(|| stderr.lines().rev().find(|l| !l.trim().is_empty()))
            .map(|l| l.trim().to_string())
            .unwrap_or_else(|| format!("yt-dlp exited with {}", status));
        Self::Failed(message)
    }
}

/// Everything the application reports back to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("Invalid YouTube URL provided")]
    InvalidUrl,

    #[error("Playlist detected with {count} videos. Please use a direct video URL instead of playlist URL.")]
    CollectionNotSupported { count: usize },

    #[error("{0}")]
    RetrievalFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),

    #[error("Cannot use download folder {path}: {reason}")]
    Destination { path: String, reason: String },
}
