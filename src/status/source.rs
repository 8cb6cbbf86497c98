use super::types::StatusResponse;
use crate::config::PollConfig;
use crate::error::{PollError, Result};
use reqwest::header::HeaderMap;
use std::future::Future;

/// Fetches the current status envelope of the polled job.
pub trait StatusSource {
    fn fetch(&mut self) -> impl Future<Output = Result<StatusResponse>>;
}

/// Reads the status envelope with a plain `GET` against a fixed endpoint.
#[derive(Clone)]
pub struct HttpStatusSource {
    client: reqwest::Client,
    url: String,
    headers: HeaderMap,
}

impl HttpStatusSource {
    pub fn new(url: String, headers: HeaderMap) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            headers,
        }
    }

    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(config.url.clone(), config.headers.clone())
    }
}

impl StatusSource for HttpStatusSource {
    async fn fetch(&mut self) -> Result<StatusResponse> {
        let response = self
            .client
            .get(&self.url)
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PollError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
