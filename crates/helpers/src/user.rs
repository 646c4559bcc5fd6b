use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

pub const USER_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/todos/1";

fn default_status() -> u16 {
    200
}

/// A decoded HTTP response: status code and JSON body
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    #[serde(default = "default_status")]
    pub status: u16,
    pub data: Value,
}

// Clone: doubles hand out the same rejection on every call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Request failed with status {0}")]
    Status(u16),
    #[error("Response body is not valid JSON: {0}")]
    InvalidBody(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserError {
    #[error("{0}")]
    Http(#[from] HttpError),
    #[error("Response has no numeric userId")]
    MissingUserId,
}

pub trait HttpClient: Clone + Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}

#[derive(Clone, Debug, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send {
        let request = self.client.get(url);
        async move {
            let response = request
                .send()
                .await
                .map_err(|e| HttpError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(HttpError::Status(status.as_u16()));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| HttpError::Transport(e.to_string()))?;
            let data = serde_json::from_slice(&body)
                .map_err(|e| HttpError::InvalidBody(e.to_string()))?;

            Ok(HttpResponse {
                status: status.as_u16(),
                data,
            })
        }
    }
}

/// Fetches the user id of the todo at [`USER_ENDPOINT`]
pub async fn get_user<C: HttpClient>(client: &C) -> Result<u64, UserError> {
    get_user_from(client, USER_ENDPOINT).await
}

#[instrument(level = "debug", skip(client))]
pub async fn get_user_from<C: HttpClient>(client: &C, url: &str) -> Result<u64, UserError> {
    let response = client.get(url).await?;
    let user_id = response
        .data
        .get("userId")
        .and_then(Value::as_u64)
        .ok_or(UserError::MissingUserId)?;

    debug!(user_id, "Fetched user");
    Ok(user_id)
}
