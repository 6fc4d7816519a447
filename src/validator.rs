use crate::config::SUPPORTED_HOSTS;

/// Returns true when `url` mentions one of the supported hosts.
///
/// Only the host substring is checked; yt-dlp does the real validation, so
/// a loose match is preferred over rejecting a URL it could handle.
pub fn is_supported_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }
    let lower = url.to_lowercase();
    SUPPORTED_HOSTS.iter().any(|host| lower.contains(host))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ")]
    #[case("https://youtu.be/dQw4w9WgXcQ")]
    #[case("https://m.youtube.com/watch?v=dQw4w9WgXcQ")]
    #[case("HTTPS://WWW.YOUTUBE.COM/watch?v=abc")]
    #[case("youtu.be/xyz")]
    #[case("https://www.youtube.com/playlist?list=PL123")]
    fn accepts_supported_hosts(#[case] url: &str) {
        assert!(is_supported_url(url));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("not_a_url")]
    #[case("https://www.google.com")]
    #[case("https://vimeo.com/123456")]
    fn rejects_everything_else(#[case] url: &str) {
        assert!(!is_supported_url(url));
    }
}
