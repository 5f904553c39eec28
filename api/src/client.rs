use crate::standings::Standings;
use crate::wire::{ErrorBody, InsertedId};
use crate::{PredictionRecord, ResultRecord, Stored};
use log::debug;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8787";

/// Client for the pool server's scores, predictions and results endpoints.
#[derive(Debug, Clone)]
pub struct PoolApi {
    client: Client,
    base_url: String,
    timeout: Duration,
    admin_token: Option<String>,
}

impl Default for PoolApi {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Unauthorized(String),
    Rejected { status: u16, message: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            ApiError::Rejected { status, message } => write!(f, "Server returned {status}: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Outcome of a scores request. Missing results are a normal state, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoresOutcome {
    Posted(Standings),
    NotPosted,
}

impl PoolApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("playoff-pool/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
            admin_token: None,
        }
    }

    /// Server from `POOL_SERVER_URL`, falling back to the local default.
    pub fn from_env() -> Self {
        match std::env::var("POOL_SERVER_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }

    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch computed scores and standings.
    pub async fn fetch_scores(&self) -> ApiResult<ScoresOutcome> {
        match self.get::<Standings>("/api/scores").await {
            Ok(standings) => Ok(ScoresOutcome::Posted(standings)),
            Err(ApiError::NotFound(msg)) => {
                debug!("scores unavailable: {msg}");
                Ok(ScoresOutcome::NotPosted)
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch the current result document, if one has been posted.
    pub async fn fetch_latest_result(&self) -> ApiResult<Option<Stored<ResultRecord>>> {
        match self.get("/api/results/latest").await {
            Ok(result) => Ok(Some(result)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn submit_prediction(&self, prediction: &PredictionRecord) -> ApiResult<String> {
        let url = self.url("/api/predictions");
        let request = self.client.post(&url).json(prediction);
        let inserted: InsertedId = self.send(request, &url).await?;
        Ok(inserted.id)
    }

    /// Post a new current result. Sends the admin token when one is configured.
    pub async fn submit_result(&self, result: &ResultRecord) -> ApiResult<String> {
        let url = self.url("/api/results");
        let mut request = self.client.post(&url).json(result);
        if let Some(token) = &self.admin_token {
            request = request.bearer_auth(token);
        }
        let inserted: InsertedId = self.send(request, &url).await?;
        Ok(inserted.id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        let request = self.client.get(&url);
        self.send(request, &url).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> ApiResult<T> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;
        decode(response, url).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> ApiResult<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()));
    }

    let body = response
        .json::<ErrorBody>()
        .await
        .unwrap_or_else(|_| ErrorBody::new(status.canonical_reason().unwrap_or("request failed")));
    Err(match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(body.to_string()),
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(body.to_string()),
        _ => ApiError::Rejected { status: status.as_u16(), message: body.to_string() },
    })
}
