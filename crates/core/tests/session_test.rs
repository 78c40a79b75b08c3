//! Session behavior against a scripted in-memory API

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use moodscope_core::{
    AnalysisApi, ApiError, ApiResult, InputKind, LogOutcome, ResultKind, ResultRecord,
    SentimentScores, Session, SubmitError, Submission, VideoMetadata, View, YoutubeAnalysis,
    YoutubeConfig,
};
use serde_json::{Value, json};
use tokio::sync::Notify;

#[derive(Default)]
struct ScriptedApi {
    /// Body returned by the text/audio/video endpoints; `None` fails.
    response: Mutex<Option<Value>>,
    log_fails: bool,
    history: Option<Vec<ResultRecord>>,
    youtube: Mutex<Option<YoutubeAnalysis>>,
    /// When set, primary calls wait for a permit before answering.
    hold: Option<Arc<Notify>>,
    entered: Arc<Notify>,
    calls: Mutex<Vec<String>>,
    logged: Mutex<Vec<ResultRecord>>,
}

impl ScriptedApi {
    fn answering(body: Value) -> Self {
        Self {
            response: Mutex::new(Some(body)),
            ..Self::default()
        }
    }

    fn held(mut self) -> (Self, Arc<Notify>) {
        let hold = Arc::new(Notify::new());
        self.hold = Some(Arc::clone(&hold));
        (self, hold)
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn primary_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| !call.starts_with("log"))
            .count()
    }

    async fn primary(&self, call: String) -> ApiResult<Value> {
        self.calls.lock().unwrap().push(call);
        self.entered.notify_one();
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        self.response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| server_error("analysis endpoint"))
    }
}

fn server_error(endpoint: &'static str) -> ApiError {
    ApiError::Status {
        endpoint,
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[async_trait]
impl AnalysisApi for ScriptedApi {
    async fn analyze_text(&self, text: &str) -> ApiResult<Value> {
        self.primary(format!("text:{text}")).await
    }

    async fn analyze_audio(&self, file: &Path) -> ApiResult<Value> {
        self.primary(format!("audio:{}", file.display())).await
    }

    async fn analyze_video(&self, file: &Path) -> ApiResult<Value> {
        self.primary(format!("video:{}", file.display())).await
    }

    async fn record_analysis(&self, record: &ResultRecord) -> ApiResult<()> {
        self.calls.lock().unwrap().push(format!("log:{}", record.kind));
        if self.log_fails {
            return Err(server_error("analysis log endpoint"));
        }
        self.logged.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn fetch_history(&self) -> ApiResult<Vec<ResultRecord>> {
        self.calls.lock().unwrap().push("history".into());
        self.history
            .clone()
            .ok_or_else(|| server_error("history endpoint"))
    }

    async fn analyze_youtube(&self, video_id: &str, max_comments: u32) -> ApiResult<YoutubeAnalysis> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("youtube:{video_id}:{max_comments}"));
        self.entered.notify_one();
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        self.youtube
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| server_error("youtube analyze endpoint"))
    }
}

fn session_with(api: &Arc<ScriptedApi>) -> Session {
    Session::new(api.clone(), YoutubeConfig::default())
}

#[tokio::test]
async fn text_submission_appends_record_and_clears_field() {
    let api = Arc::new(ScriptedApi::answering(
        json!({"sentiment": "positive", "confidence": 0.92}),
    ));
    let session = session_with(&api);
    session.set_text("I love this");

    let outcome = session.submit_text().await;

    let Submission::Succeeded { record, log } = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(log, LogOutcome::Recorded);
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        json!({"type": "text", "input": "I love this", "sentiment": "positive", "confidence": 0.92})
    );

    let state = session.snapshot();
    assert_eq!(state.results, vec![record.clone()]);
    assert_eq!(state.text, "");
    assert!(!state.loading);
    assert_eq!(state.error, None);

    assert_eq!(api.calls(), vec!["text:I love this", "log:text"]);
    assert_eq!(*api.logged.lock().unwrap(), vec![record]);
}

#[tokio::test]
async fn response_with_null_tag_still_succeeds_and_is_logged() {
    let api = Arc::new(ScriptedApi::answering(
        json!({"type": null, "sentiment": "positive"}),
    ));
    let session = session_with(&api);
    session.set_text("hi");

    let outcome = session.submit_text().await;

    let Submission::Succeeded { record, log } = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(log, LogOutcome::Recorded);
    assert_eq!(record.kind, ResultKind::Other(String::new()));
    assert_eq!(api.logged.lock().unwrap().len(), 1);

    let state = session.snapshot();
    assert_eq!(state.error, None);
    assert_eq!(state.results.len(), 1);
    assert_eq!(state.text, "");
}

#[tokio::test]
async fn empty_text_is_rejected_locally() {
    let api = Arc::new(ScriptedApi::answering(json!({})));
    let session = session_with(&api);

    let outcome = session.submit_text().await;

    assert_eq!(
        outcome,
        Submission::Rejected(SubmitError::EmptyInput(InputKind::Text))
    );
    let state = session.snapshot();
    assert_eq!(state.error.as_deref(), Some("Please enter text"));
    assert!(!state.loading);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn unset_files_are_rejected_locally() {
    let api = Arc::new(ScriptedApi::answering(json!({})));
    let session = session_with(&api);

    assert_eq!(
        session.submit_audio().await.error(),
        Some(&SubmitError::EmptyInput(InputKind::Audio))
    );
    assert_eq!(
        session.submit_video().await.error(),
        Some(&SubmitError::EmptyInput(InputKind::Video))
    );
    assert_eq!(
        session.snapshot().error.as_deref(),
        Some("Please select a video file")
    );
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn audio_record_uses_file_name_as_input() {
    let api = Arc::new(ScriptedApi::answering(json!({"emotion": "calm"})));
    let session = session_with(&api);
    session.select_audio(Some(PathBuf::from("/recordings/call.wav")));

    let outcome = session.submit_audio().await;

    let Submission::Succeeded { record, .. } = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(record.kind, ResultKind::Audio);
    assert_eq!(record.input.as_deref(), Some("call.wav"));
    assert_eq!(record.emotion.as_deref(), Some("calm"));
    assert_eq!(session.snapshot().audio_file, None);
    assert_eq!(api.calls()[0], "audio:/recordings/call.wav");
}

#[tokio::test]
async fn failure_leaves_results_and_input_untouched() {
    let api = Arc::new(ScriptedApi::answering(json!({"sentiment": "neutral"})));
    let session = session_with(&api);
    session.set_text("first");
    assert!(matches!(
        session.submit_text().await,
        Submission::Succeeded { .. }
    ));

    *api.response.lock().unwrap() = None;
    session.set_text("second");
    let outcome = session.submit_text().await;

    assert_eq!(
        outcome,
        Submission::Failed(SubmitError::NetworkOrServerFailure(InputKind::Text))
    );
    let state = session.snapshot();
    assert_eq!(state.results.len(), 1);
    assert_eq!(state.results[0].input.as_deref(), Some("first"));
    assert_eq!(state.text, "second");
    assert_eq!(state.error.as_deref(), Some("Text analysis failed"));
    assert!(!state.loading);
}

#[tokio::test]
async fn next_submission_clears_previous_error() {
    let api = Arc::new(ScriptedApi::answering(json!({"sentiment": "neutral"})));
    let session = session_with(&api);
    session.submit_text().await;
    assert!(session.snapshot().error.is_some());

    session.set_text("now with text");
    session.submit_text().await;
    assert_eq!(session.snapshot().error, None);
}

#[tokio::test]
async fn submissions_while_loading_are_ignored() {
    let (api, hold) = ScriptedApi::answering(json!({"sentiment": "positive"})).held();
    let api = Arc::new(api);
    let session = session_with(&api);
    session.set_text("slow one");

    let background = session.clone();
    let first = tokio::spawn(async move { background.submit_text().await });
    api.entered.notified().await;
    assert!(session.is_loading());

    assert_eq!(session.submit_text().await, Submission::Ignored);
    assert_eq!(session.submit_audio().await, Submission::Ignored);
    assert_eq!(session.submit_youtube().await, Submission::Ignored);
    session.set_text("edited mid-flight");
    assert_eq!(session.snapshot().text, "slow one");
    assert_eq!(session.snapshot().error, None);

    hold.notify_one();
    let outcome = first.await.unwrap();

    assert!(matches!(outcome, Submission::Succeeded { .. }));
    assert_eq!(api.primary_calls(), 1);
    let state = session.snapshot();
    assert_eq!(state.results.len(), 1);
    assert!(!state.loading);
}

#[tokio::test]
async fn log_failure_is_reported_without_losing_the_result() {
    let api = Arc::new(ScriptedApi {
        log_fails: true,
        ..ScriptedApi::answering(json!({"sentiment": "positive"}))
    });
    let session = session_with(&api);
    session.set_text("keep me");

    let outcome = session.submit_text().await;

    let Submission::Succeeded { log, .. } = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert!(matches!(log, LogOutcome::Failed(_)));
    let state = session.snapshot();
    assert_eq!(state.results.len(), 1);
    assert_eq!(state.error, None);
    assert!(state.log_error.is_some());
}

#[tokio::test]
async fn leaving_the_view_drops_the_late_response() {
    let (api, hold) = ScriptedApi::answering(json!({"sentiment": "positive"})).held();
    let api = Arc::new(api);
    let session = session_with(&api);
    session.set_text("abandoned");

    let background = session.clone();
    let pending = tokio::spawn(async move { background.submit_text().await });
    api.entered.notified().await;

    session.navigate(View::Youtube);
    hold.notify_one();

    assert_eq!(pending.await.unwrap(), Submission::Cancelled);
    let state = session.snapshot();
    assert!(state.results.is_empty());
    assert_eq!(state.text, "abandoned");
    assert!(!state.loading);
    assert_eq!(state.view, View::Youtube);
    assert!(api.logged.lock().unwrap().is_empty());

    session.navigate(View::Main);
    hold.notify_one();
    assert!(matches!(
        session.submit_text().await,
        Submission::Succeeded { .. }
    ));
}

#[tokio::test]
async fn invalid_youtube_link_makes_no_request() {
    let api = Arc::new(ScriptedApi::default());
    let session = session_with(&api);

    for link in ["", "https://vimeo.com/42", "not a link"] {
        session.set_youtube_link(link);
        assert_eq!(
            session.submit_youtube().await,
            Submission::Rejected(SubmitError::InvalidLink)
        );
    }

    assert_eq!(
        session.snapshot().error.as_deref(),
        Some("Invalid YouTube link")
    );
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn youtube_analysis_replaces_view_state_wholesale() {
    let first = YoutubeAnalysis {
        video: VideoMetadata {
            thumbnail: "https://img.youtube.com/vi/abc123/hqdefault.jpg".into(),
            title: "First".into(),
            likes: 10,
            comments: 4,
        },
        sentiment: SentimentScores::new(0.5, 0.25, 0.25),
    };
    let api = Arc::new(ScriptedApi {
        youtube: Mutex::new(Some(first.clone())),
        ..ScriptedApi::default()
    });
    let session = session_with(&api);
    session.navigate(View::Youtube);
    session.set_youtube_link("https://youtu.be/abc123?t=5");

    assert_eq!(
        session.submit_youtube().await,
        Submission::Analyzed(first.clone())
    );
    assert_eq!(api.calls(), vec!["youtube:abc123?t=5:100"]);

    let state = session.snapshot();
    assert_eq!(state.youtube.video, Some(first.video));
    assert_eq!(state.youtube.link, "https://youtu.be/abc123?t=5");
    assert!(state.results.is_empty());

    let second = YoutubeAnalysis {
        video: VideoMetadata {
            title: "Second".into(),
            ..VideoMetadata::default()
        },
        sentiment: SentimentScores {
            neutral: Some(1.0),
            ..SentimentScores::default()
        },
    };
    *api.youtube.lock().unwrap() = Some(second.clone());
    session.set_youtube_link("https://www.youtube.com/watch?v=xyz&t=1");
    session.submit_youtube().await;

    let state = session.snapshot();
    assert_eq!(state.youtube.video, Some(second.video));
    assert_eq!(state.youtube.sentiment, Some(second.sentiment));
    assert_eq!(api.calls()[1], "youtube:xyz:100");
}

#[tokio::test]
async fn youtube_failure_keeps_previous_summary() {
    let api = Arc::new(ScriptedApi::default());
    let session = session_with(&api);
    session.set_youtube_link("https://youtu.be/abc123");

    assert_eq!(
        session.submit_youtube().await,
        Submission::Failed(SubmitError::NetworkOrServerFailure(InputKind::Youtube))
    );
    let state = session.snapshot();
    assert_eq!(state.error.as_deref(), Some("YouTube analysis failed"));
    assert_eq!(state.youtube.video, None);
    assert!(!state.loading);
}

#[tokio::test]
async fn history_seeds_the_result_list() {
    let records: Vec<ResultRecord> = serde_json::from_value(json!([
        {"type": "text", "input": "old", "sentiment": "negative"},
        {"type": "youtube", "input": "abc", "sentiment": {"positive": 1.0}}
    ]))
    .unwrap();
    let api = Arc::new(ScriptedApi {
        history: Some(records.clone()),
        ..ScriptedApi::default()
    });
    let session = session_with(&api);

    assert_eq!(session.load_history().await, Ok(2));
    assert_eq!(session.snapshot().results, records);
}

#[tokio::test]
async fn history_failure_sets_error() {
    let api = Arc::new(ScriptedApi::default());
    let session = session_with(&api);

    assert_eq!(
        session.load_history().await,
        Err(SubmitError::HistoryFetchFailure)
    );
    let state = session.snapshot();
    assert_eq!(
        state.error.as_deref(),
        Some("Failed to load analysis history")
    );
    assert!(state.results.is_empty());
}
