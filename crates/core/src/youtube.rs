use once_cell::sync::Lazy;
use regex::Regex;

static VIDEO_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([^&]+)").expect("video id pattern is valid")
});

/// Pull the video id out of a pasted `youtube.com/watch?v=ID` or
/// `youtu.be/ID` link.
///
/// The id runs up to the next `&` or the end of the string. Only `&` ends
/// it: `youtu.be/abc123?t=5` yields `abc123?t=5`.
pub fn extract_video_id(link: &str) -> Option<&str> {
    VIDEO_ID_PATTERN
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str())
}
