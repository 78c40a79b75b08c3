use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde_json::Value;
use uuid::Uuid;

use crate::{
    api::{AnalysisApi, ApiResult, HttpAnalysisApi},
    cancel::{self, CancellationToken},
    config::{AppConfig, YoutubeConfig},
    error::{ApiError, Result, SubmitError},
    state::{AppState, View},
    types::{ResultKind, ResultRecord, YoutubeAnalysis},
    youtube::extract_video_id,
};

/// The four things a user can submit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    Text,
    Audio,
    Video,
    Youtube,
}

impl InputKind {
    pub fn label(&self) -> &'static str {
        match self {
            InputKind::Text => "Text",
            InputKind::Audio => "Audio",
            InputKind::Video => "Video",
            InputKind::Youtube => "YouTube",
        }
    }

    pub fn result_kind(&self) -> ResultKind {
        match self {
            InputKind::Text => ResultKind::Text,
            InputKind::Audio => ResultKind::Audio,
            InputKind::Video => ResultKind::Video,
            InputKind::Youtube => ResultKind::Youtube,
        }
    }

    fn view(&self) -> View {
        match self {
            InputKind::Youtube => View::Youtube,
            _ => View::Main,
        }
    }
}

/// Result of the analysis-log call that follows a successful analysis.
#[derive(Clone, Debug, PartialEq)]
pub enum LogOutcome {
    Recorded,
    Failed(String),
}

/// What a submit action ended with.
#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
    /// Another submission held the loading gate. Nothing happened.
    Ignored,
    /// Input failed validation. No request was made.
    Rejected(SubmitError),
    /// A record was appended to the result list.
    Succeeded {
        record: ResultRecord,
        log: LogOutcome,
    },
    /// The YouTube view got new video metadata and a sentiment summary.
    Analyzed(YoutubeAnalysis),
    Failed(SubmitError),
    /// The view was left while the request was in flight. The response was
    /// dropped without touching state.
    Cancelled,
}

impl Submission {
    pub fn error(&self) -> Option<&SubmitError> {
        match self {
            Submission::Rejected(err) | Submission::Failed(err) => Some(err),
            _ => None,
        }
    }
}

struct ViewTokens {
    main: CancellationToken,
    youtube: CancellationToken,
}

impl ViewTokens {
    fn get(&self, view: View) -> &CancellationToken {
        match view {
            View::Main => &self.main,
            View::Youtube => &self.youtube,
        }
    }

    fn renew(&mut self, view: View) -> CancellationToken {
        let fresh = cancel::new_token();
        let slot = match view {
            View::Main => &mut self.main,
            View::Youtube => &mut self.youtube,
        };
        std::mem::replace(slot, fresh)
    }
}

struct SessionInner {
    id: Uuid,
    state: Mutex<AppState>,
    tokens: Mutex<ViewTokens>,
    api: Arc<dyn AnalysisApi>,
    youtube: YoutubeConfig,
}

/// The application state object. Every mutation goes through one method
/// per user action; the state lock is never held across a request.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the loading gate for one submission and releases it on drop,
/// whichever way the submission ends.
struct LoadingGuard {
    session: Arc<SessionInner>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        lock(&self.session.state).loading = false;
    }
}

struct Started<T> {
    submission_id: Uuid,
    input: T,
    token: CancellationToken,
    guard: LoadingGuard,
}

impl Session {
    pub fn new(api: Arc<dyn AnalysisApi>, youtube: YoutubeConfig) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: Uuid::new_v4(),
                state: Mutex::new(AppState::default()),
                tokens: Mutex::new(ViewTokens {
                    main: cancel::new_token(),
                    youtube: cancel::new_token(),
                }),
                api,
                youtube,
            }),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api = HttpAnalysisApi::new(config)?;
        Ok(Self::new(Arc::new(api), config.youtube.clone()))
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn youtube_config(&self) -> &YoutubeConfig {
        &self.inner.youtube
    }

    pub fn snapshot(&self) -> AppState {
        lock(&self.inner.state).clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.inner.state).loading
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.edit(|state| state.text = text.into());
    }

    pub fn select_audio(&self, file: Option<PathBuf>) {
        self.edit(|state| state.audio_file = file);
    }

    pub fn select_video(&self, file: Option<PathBuf>) {
        self.edit(|state| state.video_file = file);
    }

    pub fn set_youtube_link(&self, link: impl Into<String>) {
        self.edit(|state| state.youtube.link = link.into());
    }

    /// Form fields are read-only while a request is in flight.
    fn edit(&self, apply: impl FnOnce(&mut AppState)) {
        let mut state = lock(&self.inner.state);
        if state.loading {
            tracing::debug!(session_id = %self.inner.id, "edit ignored while loading");
            return;
        }
        apply(&mut state);
    }

    /// Switch views. In-flight work of the view being left is cancelled.
    pub fn navigate(&self, view: View) {
        // Tokens are only locked under the state lock, so a submission either
        // sees the old view and its token or the new view and a fresh token.
        let (left, stale) = {
            let mut state = lock(&self.inner.state);
            if state.view == view {
                return;
            }
            let left = std::mem::replace(&mut state.view, view);
            (left, lock(&self.inner.tokens).renew(left))
        };
        cancel::cancel(&stale);
        tracing::debug!(session_id = %self.inner.id, from = ?left, to = ?view, "navigated");
    }

    /// Seed the result list from the history endpoint. Meant to run once,
    /// at startup; the list is replaced wholesale.
    pub async fn load_history(&self) -> std::result::Result<usize, SubmitError> {
        match self.inner.api.fetch_history().await {
            Ok(records) => {
                let count = records.len();
                lock(&self.inner.state).results = records;
                tracing::debug!(session_id = %self.inner.id, count, "history loaded");
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(session_id = %self.inner.id, error = %err, "history fetch failed");
                let err = SubmitError::HistoryFetchFailure;
                lock(&self.inner.state).error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn submit_text(&self) -> Submission {
        let started = match self.begin(InputKind::Text, |state| {
            if state.text.is_empty() {
                Err(SubmitError::EmptyInput(InputKind::Text))
            } else {
                Ok(state.text.clone())
            }
        }) {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        let response = self.inner.api.analyze_text(&started.input).await;
        let input = started.input.clone();
        self.finish_analysis(InputKind::Text, input, response, started)
            .await
    }

    pub async fn submit_audio(&self) -> Submission {
        self.submit_file(InputKind::Audio).await
    }

    pub async fn submit_video(&self) -> Submission {
        self.submit_file(InputKind::Video).await
    }

    async fn submit_file(&self, kind: InputKind) -> Submission {
        let started = match self.begin(kind, |state| {
            let selected = match kind {
                InputKind::Audio => state.audio_file.clone(),
                _ => state.video_file.clone(),
            };
            selected.ok_or(SubmitError::EmptyInput(kind))
        }) {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        let response = match kind {
            InputKind::Audio => self.inner.api.analyze_audio(&started.input).await,
            _ => self.inner.api.analyze_video(&started.input).await,
        };
        let input = display_name(&started.input);
        self.finish_analysis(kind, input, response, started).await
    }

    pub async fn submit_youtube(&self) -> Submission {
        let started = match self.begin(InputKind::Youtube, |state| {
            extract_video_id(&state.youtube.link)
                .map(str::to_string)
                .ok_or(SubmitError::InvalidLink)
        }) {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        let response = self
            .inner
            .api
            .analyze_youtube(&started.input, self.inner.youtube.max_comments)
            .await;

        if cancel::is_cancelled(&started.token) {
            return self.cancelled(&started);
        }

        match response {
            Ok(analysis) => {
                {
                    let mut state = lock(&self.inner.state);
                    state.youtube.video = Some(analysis.video.clone());
                    state.youtube.sentiment = Some(analysis.sentiment);
                }
                tracing::debug!(
                    session_id = %self.inner.id,
                    submission_id = %started.submission_id,
                    video_id = %started.input,
                    "youtube analysis succeeded"
                );
                drop(started.guard);
                Submission::Analyzed(analysis)
            }
            Err(err) => self.fail(InputKind::Youtube, err, started),
        }
    }

    /// Idle -> Validating -> Requesting. Returns the outcome directly when
    /// the gate is held or validation fails.
    fn begin<T>(
        &self,
        kind: InputKind,
        validate: impl FnOnce(&AppState) -> std::result::Result<T, SubmitError>,
    ) -> std::result::Result<Started<T>, Submission> {
        let submission_id = Uuid::new_v4();
        let mut state = lock(&self.inner.state);
        if state.loading {
            tracing::debug!(
                session_id = %self.inner.id,
                kind = kind.label(),
                "submission ignored while loading"
            );
            return Err(Submission::Ignored);
        }

        state.error = None;
        let input = match validate(&state) {
            Ok(input) => input,
            Err(err) => {
                tracing::debug!(
                    session_id = %self.inner.id,
                    %submission_id,
                    kind = kind.label(),
                    error = %err,
                    "input rejected"
                );
                state.error = Some(err.to_string());
                return Err(Submission::Rejected(err));
            }
        };

        state.loading = true;
        let token = lock(&self.inner.tokens).get(kind.view()).clone();
        drop(state);

        tracing::debug!(
            session_id = %self.inner.id,
            %submission_id,
            kind = kind.label(),
            "requesting"
        );

        Ok(Started {
            submission_id,
            input,
            token,
            guard: LoadingGuard {
                session: Arc::clone(&self.inner),
            },
        })
    }

    async fn finish_analysis<T>(
        &self,
        kind: InputKind,
        input: String,
        response: ApiResult<Value>,
        started: Started<T>,
    ) -> Submission {
        if cancel::is_cancelled(&started.token) {
            return self.cancelled(&started);
        }

        let record = match response.and_then(|body| {
            ResultRecord::normalize(kind.result_kind(), &input, body).map_err(ApiError::from)
        }) {
            Ok(record) => record,
            Err(err) => return self.fail(kind, err, started),
        };

        let log = match self.inner.api.record_analysis(&record).await {
            Ok(()) => LogOutcome::Recorded,
            Err(err) => {
                tracing::warn!(
                    session_id = %self.inner.id,
                    submission_id = %started.submission_id,
                    error = %err,
                    "analysis log call failed"
                );
                LogOutcome::Failed(err.to_string())
            }
        };

        if cancel::is_cancelled(&started.token) {
            return self.cancelled(&started);
        }

        {
            let mut state = lock(&self.inner.state);
            state.results.push(record.clone());
            match kind {
                InputKind::Text => state.text.clear(),
                InputKind::Audio => state.audio_file = None,
                InputKind::Video => state.video_file = None,
                InputKind::Youtube => {}
            }
            state.log_error = match &log {
                LogOutcome::Recorded => None,
                LogOutcome::Failed(reason) => Some(reason.clone()),
            };
        }

        tracing::debug!(
            session_id = %self.inner.id,
            submission_id = %started.submission_id,
            kind = kind.label(),
            "analysis succeeded"
        );
        drop(started.guard);
        Submission::Succeeded { record, log }
    }

    fn fail<T>(&self, kind: InputKind, cause: ApiError, started: Started<T>) -> Submission {
        tracing::warn!(
            session_id = %self.inner.id,
            submission_id = %started.submission_id,
            kind = kind.label(),
            error = %cause,
            "analysis failed"
        );
        let err = SubmitError::NetworkOrServerFailure(kind);
        lock(&self.inner.state).error = Some(err.to_string());
        drop(started.guard);
        Submission::Failed(err)
    }

    fn cancelled<T>(&self, started: &Started<T>) -> Submission {
        tracing::debug!(
            session_id = %self.inner.id,
            submission_id = %started.submission_id,
            "response dropped, view was left"
        );
        Submission::Cancelled
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
