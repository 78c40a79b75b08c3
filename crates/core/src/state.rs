use std::path::PathBuf;

use crate::types::{ResultRecord, SentimentScores, VideoMetadata};

/// The two screens of the app. Leaving one cancels whatever it has in
/// flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Main,
    Youtube,
}

/// State owned by the YouTube view. Replaced wholesale on every
/// successful analysis, never merged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct YoutubeState {
    pub link: String,
    pub video: Option<VideoMetadata>,
    pub sentiment: Option<SentimentScores>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub view: View,

    // form fields
    pub text: String,
    pub audio_file: Option<PathBuf>,
    pub video_file: Option<PathBuf>,

    /// Completed analyses in completion order. Only ever appended to, or
    /// replaced by the startup history fetch.
    pub results: Vec<ResultRecord>,

    /// The loading gate. True only while a request is in flight.
    pub loading: bool,
    pub error: Option<String>,
    /// Why the last analysis-log call failed, if it did.
    pub log_error: Option<String>,

    pub youtube: YoutubeState,
}

impl AppState {
    pub fn latest(&self) -> Option<&ResultRecord> {
        self.results.last()
    }
}
