use color_eyre::eyre::{Context, Result};
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::config::AppConfig;

const ERROR_BODY_LIMIT: usize = 200;

/// Errors surfaced by the sentiment backend client. Network-shaped failures are
/// split from payload-shaped ones so callers can report them differently.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {path} timed out")]
    Timeout { path: String },

    #[error("backend unreachable for {path}")]
    Unreachable { path: String },

    #[error("request to {path} failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("malformed response from {path}: {detail}")]
    Malformed { path: String, detail: String },
}

impl ApiError {
    fn from_reqwest(path: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                path: path.to_string(),
            }
        } else if err.is_connect() {
            Self::Unreachable {
                path: path.to_string(),
            }
        } else {
            Self::Request {
                path: path.to_string(),
                source: err,
            }
        }
    }
}

/// Thin HTTP client for the sentiment analysis backend. Cheap to clone, so
/// background workers can own their own handle.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .wrap_err("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.backend_url.clone(),
        })
    }

    /// GET `path` and decode the JSON body into `T`. Non-2xx responses and
    /// undecodable bodies are both errors.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| ApiError::from_reqwest(path, err))?;
        self.decode_json(path, response).await
    }

    /// POST `body` as JSON to `path` and return the backend's acknowledgement
    /// payload verbatim.
    pub async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| ApiError::from_reqwest(path, err))?;
        self.decode_json(path, response).await
    }

    async fn decode_json<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body: trim_error_body(&body),
            });
        }
        match response.json::<T>().await {
            Ok(value) => Ok(value),
            Err(err) if err.is_decode() => Err(ApiError::Malformed {
                path: path.to_string(),
                detail: err.to_string(),
            }),
            Err(err) => Err(ApiError::from_reqwest(path, err)),
        }
    }
}

fn trim_error_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((byte_index, _)) => format!("{}…", &trimmed[..byte_index]),
        None => trimmed.to_string(),
    }
}
