//! moodscope core library
//!
//! Client side of a sentiment-analysis product: collects text, audio,
//! video and YouTube links, forwards them to external analysis endpoints,
//! and turns the responses into result records and chart data.

pub mod api;
pub mod cancel;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod format;
pub mod render;
pub mod session;
pub mod state;
pub mod types;
pub mod youtube;

pub use api::{AnalysisApi, ApiResult, HttpAnalysisApi};
pub use config::{AppConfig, HttpConfig, YoutubeConfig};
pub use endpoints::{Endpoint, Endpoints};
pub use error::{ApiError, MoodscopeError, Result, SubmitError};
pub use format::{format_results_readable, format_youtube_readable};
pub use render::{render_results, render_youtube, render_youtube_state};
pub use session::{InputKind, LogOutcome, Session, Submission};
pub use state::{AppState, View, YoutubeState};
pub use types::{
    Confidence, ResultKind, ResultRecord, Sentiment, SentimentScores, VideoMetadata,
    YoutubeAnalysis,
};
pub use youtube::extract_video_id;
