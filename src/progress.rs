/// Marker prepended to every progress line through `--progress-template`.
pub const PROGRESS_PREFIX: &str = "vidfetch|";

/// `--progress-template` value matching [`parse_progress_from_line`].
pub const PROGRESS_TEMPLATE: &str =
    "download:vidfetch|%(progress.status)s|%(progress._percent_str)s|%(progress._speed_str)s";

/// yt-dlp's progress hook status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Downloading,
    Finished,
    Error,
    Other,
}

/// One raw tick reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTick {
    pub status: ProgressStatus,
    pub percent: String,
    pub speed: String,
}

pub fn parse_progress_from_line(line: &str) -> Option<ProgressTick> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let mut parts = rest.splitn(3, '|');
    let status = match parts.next()?.trim() {
        "downloading" => ProgressStatus::Downloading,
        "finished" => ProgressStatus::Finished,
        "error" => ProgressStatus::Error,
        _ => ProgressStatus::Other,
    };
    let percent = non_empty(parts.next()?, "0%");
    let speed = non_empty(parts.next().unwrap_or(""), "N/A");
    Some(ProgressTick {
        status,
        percent,
        speed,
    })
}

/// Turns a percent string such as `" 42.5%"` into `0.425`.
pub fn percent_to_fraction(percent: &str) -> Option<f32> {
    let number = percent.trim().strip_suffix('%')?;
    let v = number.trim().parse::<f32>().ok()?;
    Some((v / 100.0).clamp(0.0, 1.0))
}

fn non_empty(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value == "NA" {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
