// src/client/mod.rs

use crate::errors::Result;
use crate::input::UploadFile;
use crate::models::{Mode, ResponseEnvelope};

pub mod http;

pub use http::HttpAnalysisClient;

/// The remote service that turns a system description into a security report.
///
/// Both calls carry the analysis mode and resolve to the raw envelope; decoding
/// the embedded report is left to the caller.
///
/// Implementations can use plain `async fn`; callers rely on the futures being `Send`.
pub trait AnalysisApi: Send + Sync {
    /// Submits typed text as `{"user_input": ...}`.
    fn analyze_text(
        &self,
        text: &str,
        mode: Mode,
    ) -> impl std::future::Future<Output = Result<ResponseEnvelope>> + Send;

    /// Submits a file as a multipart form with a single `file` field.
    fn analyze_upload(
        &self,
        file: &UploadFile,
        mode: Mode,
    ) -> impl std::future::Future<Output = Result<ResponseEnvelope>> + Send;
}
