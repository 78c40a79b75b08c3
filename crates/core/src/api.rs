use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::AppConfig,
    endpoints::{Endpoint, Endpoints},
    error::{ApiError, MoodscopeError},
    types::{ResultRecord, YoutubeAnalysis},
};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// The external services a session talks to.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn analyze_text(&self, text: &str) -> ApiResult<Value>;

    async fn analyze_audio(&self, file: &Path) -> ApiResult<Value>;

    async fn analyze_video(&self, file: &Path) -> ApiResult<Value>;

    /// Record a finished analysis on the local server. The response body
    /// is ignored.
    async fn record_analysis(&self, record: &ResultRecord) -> ApiResult<()>;

    async fn fetch_history(&self) -> ApiResult<Vec<ResultRecord>>;

    async fn analyze_youtube(&self, video_id: &str, max_comments: u32) -> ApiResult<YoutubeAnalysis>;
}

pub struct HttpAnalysisApi {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpAnalysisApi {
    pub fn new(config: &AppConfig) -> Result<Self, MoodscopeError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoints: config.endpoints.clone(),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn send(
        &self,
        endpoint: Endpoint,
        request: reqwest::RequestBuilder,
    ) -> ApiResult<reqwest::Response> {
        tracing::debug!(endpoint = endpoint.name(), "sending request");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.name(),
                status,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: reqwest::RequestBuilder,
    ) -> ApiResult<T> {
        let body = self.send(endpoint, request).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn upload(&self, endpoint: Endpoint, field: &'static str, file: &Path) -> ApiResult<Value> {
        let bytes = tokio::fs::read(file).await.map_err(|source| ApiError::File {
            path: file.to_path_buf(),
            source,
        })?;
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| field.to_string());

        let form = Form::new().part(field, Part::bytes(bytes).file_name(file_name));
        let request = self
            .client
            .post(self.endpoints.url(endpoint))
            .multipart(form);

        self.send_json(endpoint, request).await
    }
}

#[async_trait]
impl AnalysisApi for HttpAnalysisApi {
    async fn analyze_text(&self, text: &str) -> ApiResult<Value> {
        let request = self
            .client
            .post(self.endpoints.url(Endpoint::Text))
            .json(&serde_json::json!({ "text": text }));

        self.send_json(Endpoint::Text, request).await
    }

    async fn analyze_audio(&self, file: &Path) -> ApiResult<Value> {
        self.upload(Endpoint::Audio, "audio", file).await
    }

    async fn analyze_video(&self, file: &Path) -> ApiResult<Value> {
        self.upload(Endpoint::Video, "video", file).await
    }

    async fn record_analysis(&self, record: &ResultRecord) -> ApiResult<()> {
        let request = self
            .client
            .post(self.endpoints.url(Endpoint::AnalysisLog))
            .json(record);

        self.send(Endpoint::AnalysisLog, request).await?;
        Ok(())
    }

    async fn fetch_history(&self) -> ApiResult<Vec<ResultRecord>> {
        let request = self.client.get(self.endpoints.url(Endpoint::History));

        self.send_json(Endpoint::History, request).await
    }

    async fn analyze_youtube(&self, video_id: &str, max_comments: u32) -> ApiResult<YoutubeAnalysis> {
        let request = self
            .client
            .post(self.endpoints.url(Endpoint::YoutubeAnalyze))
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "videoId": video_id,
                "maxComments": max_comments,
            }));

        self.send_json(Endpoint::YoutubeAnalyze, request).await
    }
}
