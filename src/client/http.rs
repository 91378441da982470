// src/client/http.rs

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Instant;

use crate::client::AnalysisApi;
use crate::errors::{AnalyzerError, Result};
use crate::input::UploadFile;
use crate::models::{http_error_message, AnalysisRequest, Mode, ResponseEnvelope};

const ANALYZE_PATH: &str = "/api/analyze";
const UPLOAD_PATH: &str = "/api/analyze-upload";
const HEALTH_PATH: &str = "/health";

/// Talks to the Analysis API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    api_base: String,
}

impl HttpAnalysisClient {
    /// Creates a new `HttpAnalysisClient` rooted at `api_base`.
    pub fn new(client: Client, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { client, api_base }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Queries the backend status route and returns its JSON body.
    pub async fn health(&self) -> Result<Value> {
        let url = self.url(HEALTH_PATH);
        log::debug!("Checking backend health at {}", url);
        let resp = self.client.get(&url).send().await?;
        let body = checked_body(resp).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl AnalysisApi for HttpAnalysisClient {
    async fn analyze_text(&self, text: &str, mode: Mode) -> Result<ResponseEnvelope> {
        let url = self.url(ANALYZE_PATH);
        log::info!("Submitting {} chars of text to {} (mode={})", text.len(), url, mode);

        let body = AnalysisRequest {
            user_input: text.to_string(),
        };

        let start = Instant::now();
        let resp = self
            .client
            .post(&url)
            .query(&[("mode", mode)])
            .json(&body)
            .send()
            .await?;

        read_envelope(resp, start).await
    }

    async fn analyze_upload(&self, file: &UploadFile, mode: Mode) -> Result<ResponseEnvelope> {
        let url = self.url(UPLOAD_PATH);
        log::info!(
            "Uploading '{}' ({} bytes, {}) to {} (mode={})",
            file.name,
            file.bytes.len(),
            file.mime,
            url,
            mode
        );

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new().part("file", part);

        let start = Instant::now();
        let resp = self
            .client
            .post(&url)
            .query(&[("mode", mode)])
            .multipart(form)
            .send()
            .await?;

        read_envelope(resp, start).await
    }
}

/// Returns the body of a successful response, or the error derived from the
/// status and the optional `detail` body.
async fn checked_body(resp: Response) -> Result<Vec<u8>> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.bytes().await.unwrap_or_default();
        return Err(AnalyzerError::Http {
            status: status.as_u16(),
            message: http_error_message(status.as_u16(), &body),
        });
    }
    Ok(resp.bytes().await?.to_vec())
}

async fn read_envelope(resp: Response, start: Instant) -> Result<ResponseEnvelope> {
    let status = resp.status();
    let body = checked_body(resp).await;
    log::info!(
        "Analysis API responded {} after {}ms",
        status,
        start.elapsed().as_millis()
    );
    Ok(serde_json::from_slice(&body?)?)
}
