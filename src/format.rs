//! Human-readable rendering of video metadata.

use crate::model::VideoMetadata;

/// `MM:SS`, or `HH:MM:SS` from one hour up.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Abbreviates at one thousand and one million. The tenths digit is
/// truncated, so 1,999,999 reads "1.9M views", not "2.0M views".
pub fn format_view_count(views: u64) -> String {
    if views >= 1_000_000 {
        let tenths = views / 100_000;
        format!("{}.{}M views", tenths / 10, tenths % 10)
    } else if views >= 1_000 {
        let tenths = views / 100;
        format!("{}.{}K views", tenths / 10, tenths % 10)
    } else {
        format!("{} views", views)
    }
}

/// `YYYYMMDD` becomes `YYYY-MM-DD`; anything else is returned as is.
pub fn format_upload_date(date: &str) -> String {
    let chars: Vec<char> = date.chars().collect();
    if chars.len() != 8 {
        return date.to_string();
    }
    let year: String = chars[..4].iter().collect();
    let month: String = chars[4..6].iter().collect();
    let day: String = chars[6..].iter().collect();
    format!("{}-{}-{}", year, month, day)
}

pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    if bytes == 0 {
        return "Unknown".to_string();
    }
    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.2} MB", b / MB)
    } else {
        format!("{:.2} KB", b / KB)
    }
}

/// Report shown in the video information window.
pub fn format_metadata(info: &VideoMetadata) -> String {
    let duration = if info.duration_seconds > 0 {
        format_duration(info.duration_seconds)
    } else {
        "Unknown".to_string()
    };
    format!(
        "Title: {}\n\n\
         Uploader: {}\n\n\
         Duration: {}\n\n\
         Views: {}\n\n\
         Upload Date: {}\n\n\
         Estimated Size: {}\n\n\
         Quality: Best available up to 720p\n\n\
         Download Path: {}\n\n\
         Video URL: {}\n\n\
         Description:\n{}\n",
        info.title,
        info.uploader,
        duration,
        format_view_count(info.view_count),
        format_upload_date(&info.upload_date),
        format_file_size(info.estimated_size_bytes),
        info.destination.display(),
        info.source_url,
        info.description_snippet,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    #[rstest]
    #[case(0, "00:00")]
    #[case(59, "00:59")]
    #[case(125, "02:05")]
    #[case(3599, "59:59")]
    #[case(3600, "01:00:00")]
    #[case(3665, "01:01:05")]
    #[case(36_000, "10:00:00")]
    fn durations(#[case] secs: u64, #[case] expected: &str) {
        assert_eq!(format_duration(secs), expected);
    }

    #[rstest]
    #[case(0, "0 views")]
    #[case(999, "999 views")]
    #[case(1_000, "1.0K views")]
    #[case(1_999, "1.9K views")]
    #[case(999_999, "999.9K views")]
    #[case(1_234_567, "1.2M views")]
    #[case(1_999_999, "1.9M views")]
    #[case(25_000_000, "25.0M views")]
    fn view_counts_truncate(#[case] views: u64, #[case] expected: &str) {
        assert_eq!(format_view_count(views), expected);
    }

    #[rstest]
    #[case("20240315", "2024-03-15")]
    #[case("unknown", "unknown")]
    #[case("2024031", "2024031")]
    #[case("202403150", "202403150")]
    #[case("", "")]
    fn upload_dates(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(format_upload_date(raw), expected);
    }

    #[rstest]
    #[case(0, "Unknown")]
    #[case(512, "0.50 KB")]
    #[case(5 * 1024 * 1024, "5.00 MB")]
    #[case(3 * 1024 * 1024 * 1024 / 2, "1.50 GB")]
    fn file_sizes(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(format_file_size(bytes), expected);
    }

    #[test]
    fn report_contains_formatted_fields() {
        let info = VideoMetadata {
            title: "Clip".to_string(),
            uploader: "Someone".to_string(),
            duration_seconds: 3665,
            view_count: 1_234_567,
            upload_date: "20240315".to_string(),
            estimated_size_bytes: 0,
            description_snippet: "Hello".to_string(),
            source_url: "https://youtu.be/abc".to_string(),
            destination: PathBuf::from("/tmp/videos"),
            video_id: Some("abc".to_string()),
            thumbnail_url: None,
            formats: Vec::new(),
        };
        let report = format_metadata(&info);
        assert!(report.contains("Duration: 01:01:05"));
        assert!(report.contains("Views: 1.2M views"));
        assert!(report.contains("Upload Date: 2024-03-15"));
        assert!(report.contains("Estimated Size: Unknown"));
        assert!(report.contains("Download Path: /tmp/videos"));
    }
}
