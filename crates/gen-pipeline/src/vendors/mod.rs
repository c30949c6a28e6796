/// Vendor adapter abstraction
///
/// One adapter per generation backend. Each adapter owns its wire encoding
/// (multipart form vs JSON) and is the only place allowed to translate the
/// canonical aspect-ratio set into a vendor's vocabulary. Adapters never
/// retry; retry policy belongs to the poller.
pub mod gemini;
pub mod grok;
pub mod mock;
pub mod sora;
pub mod veo;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tasks::{TaskOptions, TaskStatus, VendorKind};
use thiserror::Error;

use crate::config::GenerationConfig;

pub use gemini::GeminiAdapter;
pub use grok::GrokAdapter;
pub use mock::MockAdapter;
pub use sora::SoraAdapter;
pub use veo::VeoAdapter;

#[derive(Debug, Error)]
pub enum VendorError {
    /// Missing or malformed local input; no request was made.
    #[error("{0}")]
    Configuration(String),
    /// Operation the vendor cannot perform; fails before any network call.
    #[error("{0}")]
    Unsupported(String),
    /// The request never produced a response (connect/read failure).
    #[error("request failed: {0}")]
    Transport(String),
    /// Non-2xx answer, carrying the vendor's message or the HTTP status text.
    #[error("{0}")]
    Api(String),
    /// 2xx answer whose body did not match the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for VendorError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Handle returned by a create call; consumed by the poller for that one job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    pub task_id: String,
    pub status: TaskStatus,
    /// Set only by vendors that complete synchronously at create time.
    pub result_url: Option<String>,
}

/// Normalized view of one status query.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    pub status: TaskStatus,
    /// Vendor-reported progress (0-100), when the vendor exposes one.
    pub progress: Option<f32>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_secs: Option<u32>,
    pub error_message: Option<String>,
}

impl JobSnapshot {
    pub fn with_status(status: TaskStatus) -> Self {
        Self {
            status,
            progress: None,
            video_url: None,
            thumbnail_url: None,
            duration_secs: None,
            error_message: None,
        }
    }
}

#[async_trait]
pub trait VendorAdapter: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> VendorKind;

    /// Create a generation job from a text prompt.
    async fn create(
        &self,
        prompt: &str,
        sub_model: &str,
        options: &TaskOptions,
    ) -> Result<JobHandle, VendorError>;

    /// Create a job conditioned on an input image supplied as a data-URI.
    async fn create_with_image(
        &self,
        prompt: &str,
        image_data: &str,
        sub_model: &str,
        options: &TaskOptions,
    ) -> Result<JobHandle, VendorError>;

    /// Query the current state of a job.
    async fn query(&self, task_id: &str, sub_model: &str) -> Result<JobSnapshot, VendorError>;
}

/// Builds the adapter for a vendor. The orchestrator depends on this
/// interface only; tests swap in scripted adapters through it.
pub trait AdapterFactory: Send + Sync {
    fn build(
        &self,
        kind: VendorKind,
        config: &GenerationConfig,
    ) -> Result<Arc<dyn VendorAdapter>, VendorError>;
}

/// Default factory constructing the HTTP adapters.
pub struct HttpAdapterFactory;

impl AdapterFactory for HttpAdapterFactory {
    fn build(
        &self,
        kind: VendorKind,
        config: &GenerationConfig,
    ) -> Result<Arc<dyn VendorAdapter>, VendorError> {
        let adapter: Arc<dyn VendorAdapter> = match kind {
            VendorKind::Veo => Arc::new(VeoAdapter::new(config.clone())),
            VendorKind::Sora => Arc::new(SoraAdapter::new(config.clone())),
            VendorKind::Grok => Arc::new(GrokAdapter::new(config.clone())),
            VendorKind::Gemini => Arc::new(GeminiAdapter::new(config.clone())),
        };
        Ok(adapter)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Turn a non-2xx response into a request failure carrying the vendor's
/// message when one is present, else the HTTP status text.
pub(crate) async fn api_error(response: reqwest::Response) -> VendorError {
    let status = response.status();
    let status_text = status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_string();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body
            .message
            .or_else(|| body.error.and_then(|e| e.message))
            .unwrap_or_else(|| format!("API error: {}", status.as_u16())),
        Err(_) => status_text,
    };
    VendorError::Api(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_every_vendor() {
        let config = GenerationConfig::new("key");
        for kind in [
            VendorKind::Veo,
            VendorKind::Sora,
            VendorKind::Grok,
            VendorKind::Gemini,
        ] {
            let adapter = HttpAdapterFactory.build(kind, &config).unwrap();
            assert_eq!(adapter.kind(), kind);
        }
    }

    #[test]
    fn test_error_display_is_message_only() {
        let err = VendorError::Api("quota exceeded".to_string());
        assert_eq!(err.to_string(), "quota exceeded");
        let err = VendorError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "request failed: connection refused");
    }
}
