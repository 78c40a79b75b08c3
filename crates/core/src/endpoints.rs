use serde::{Deserialize, Serialize};

pub const DEFAULT_TEXT_URL: &str = "https://your-text-api-endpoint";
pub const DEFAULT_AUDIO_URL: &str = "https://your-audio-api-endpoint";
pub const DEFAULT_VIDEO_URL: &str = "https://your-video-api-endpoint";
pub const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:5000";

/// Every outbound call the client makes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Text,
    Audio,
    Video,
    AnalysisLog,
    History,
    YoutubeAnalyze,
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Text => "text sentiment endpoint",
            Endpoint::Audio => "audio sentiment endpoint",
            Endpoint::Video => "video sentiment endpoint",
            Endpoint::AnalysisLog => "analysis log endpoint",
            Endpoint::History => "history endpoint",
            Endpoint::YoutubeAnalyze => "youtube analyze endpoint",
        }
    }
}

/// Base URLs of the external services. The analysis log, history and
/// YouTube calls all hit the local server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub text_url: String,
    pub audio_url: String,
    pub video_url: String,
    pub local_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            text_url: DEFAULT_TEXT_URL.to_string(),
            audio_url: DEFAULT_AUDIO_URL.to_string(),
            video_url: DEFAULT_VIDEO_URL.to_string(),
            local_base_url: DEFAULT_LOCAL_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every endpoint at one server, the way a local dev backend
    /// serves `/text`, `/upload`, `/video` and `/api/*` side by side.
    pub fn local(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            text_url: format!("{base}/text"),
            audio_url: format!("{base}/upload"),
            video_url: format!("{base}/video"),
            local_base_url: base.to_string(),
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        let local = self.local_base_url.trim_end_matches('/');
        match endpoint {
            Endpoint::Text => self.text_url.clone(),
            Endpoint::Audio => self.audio_url.clone(),
            Endpoint::Video => self.video_url.clone(),
            Endpoint::AnalysisLog | Endpoint::YoutubeAnalyze => format!("{local}/api/analyze"),
            Endpoint::History => format!("{local}/api/history"),
        }
    }
}
